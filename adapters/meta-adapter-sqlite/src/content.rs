//! Users, topics and posts
//!
//! Read-only access to the forum content the gateway needs, plus the bounded
//! topic view used for embedded comments.

use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};

use forumgate::meta_adapter::*;
use forumgate::prelude::*;

use crate::utils::db_err;

pub(crate) fn user_from_row(row: &SqliteRow) -> Result<UserRecord, sqlx::Error> {
	Ok(UserRecord {
		user_id: UserId(row.try_get("user_id")?),
		username: row.try_get::<String, _>("username")?.into(),
		name: row.try_get::<Option<String>, _>("name")?.map(Into::into),
		email: row.try_get::<String, _>("email")?.into(),
		admin: row.try_get("admin")?,
	})
}

fn topic_from_row(row: &SqliteRow) -> Result<TopicRecord, sqlx::Error> {
	Ok(TopicRecord {
		topic_id: TopicId(row.try_get("topic_id")?),
		title: row.try_get::<String, _>("title")?.into(),
		slug: row.try_get::<String, _>("slug")?.into(),
		category_id: row.try_get::<Option<i64>, _>("category_id")?.map(CategoryId),
	})
}

pub(crate) async fn read_user(db: &SqlitePool, user_id: UserId) -> ClResult<Option<UserRecord>> {
	let row = sqlx::query("SELECT user_id, username, name, email, admin FROM users WHERE user_id = ?")
		.bind(user_id.0)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;

	row.as_ref().map(user_from_row).transpose().map_err(db_err)
}

pub(crate) async fn read_topic(db: &SqlitePool, topic_id: TopicId) -> ClResult<Option<TopicRecord>> {
	let row = sqlx::query("SELECT topic_id, title, slug, category_id FROM topics WHERE topic_id = ?")
		.bind(topic_id.0)
		.fetch_optional(db)
		.await
		.map_err(db_err)?;

	row.as_ref().map(topic_from_row).transpose().map_err(db_err)
}

pub(crate) async fn read_post(db: &SqlitePool, post_id: PostId) -> ClResult<Option<PostRecord>> {
	let row = sqlx::query(
		"SELECT post_id, topic_id, post_number, user_id FROM posts
		WHERE post_id = ? AND deleted_at IS NULL",
	)
	.bind(post_id.0)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	row.map(|row| {
		Ok(PostRecord {
			post_id: PostId(row.try_get("post_id")?),
			topic_id: TopicId(row.try_get("topic_id")?),
			post_number: row.try_get("post_number")?,
			user_id: row.try_get::<Option<i64>, _>("user_id")?.map(UserId),
		})
	})
	.transpose()
	.map_err(db_err)
}

/// Append the shared FROM/WHERE part of the topic view queries
fn push_view_filter<'a>(
	query: &mut QueryBuilder<'a, Sqlite>,
	topic_id: TopicId,
	opts: &TopicViewOptions<'a>,
) {
	query.push(" FROM posts p LEFT JOIN users u ON u.user_id = p.user_id WHERE p.topic_id = ");
	query.push_bind(topic_id.0);
	query.push(" AND p.deleted_at IS NULL");

	if opts.exclude_first {
		query.push(" AND p.post_number > 1");
	}
	if opts.exclude_deleted_users {
		query.push(" AND p.user_id IS NOT NULL AND u.user_id IS NOT NULL");
	}
	if opts.exclude_hidden {
		query.push(" AND p.hidden = 0");
	}
	if let Some(author) = opts.author_username {
		query.push(" AND u.username = ");
		query.push_bind(author);
	}
}

pub(crate) async fn build_topic_view(
	db: &SqlitePool,
	topic_id: TopicId,
	opts: &TopicViewOptions<'_>,
) -> ClResult<TopicView> {
	let topic = read_topic(db, topic_id).await?.ok_or(Error::NotFound)?;

	let mut count_query = QueryBuilder::new("SELECT count(*) AS cnt");
	push_view_filter(&mut count_query, topic_id, opts);
	let posts_count: i64 = count_query
		.build()
		.fetch_one(db)
		.await
		.and_then(|row| row.try_get("cnt"))
		.map_err(db_err)?;

	let mut query = QueryBuilder::new(
		"SELECT p.post_id, p.post_number, p.cooked, p.created_at, u.username, u.name",
	);
	push_view_filter(&mut query, topic_id, opts);
	query.push(" ORDER BY p.post_number LIMIT ");
	query.push_bind(i64::from(opts.limit));

	let rows = query.build().fetch_all(db).await.map_err(db_err)?;
	let posts = rows
		.iter()
		.map(|row| {
			Ok(PostView {
				post_id: PostId(row.try_get("post_id")?),
				post_number: row.try_get("post_number")?,
				username: row.try_get::<Option<String>, _>("username")?.map(Into::into),
				name: row.try_get::<Option<String>, _>("name")?.map(Into::into),
				cooked: row.try_get::<String, _>("cooked")?.into(),
				created_at: Timestamp(row.try_get("created_at")?),
			})
		})
		.collect::<Result<Vec<_>, sqlx::Error>>()
		.map_err(db_err)?;

	debug!(topic_id = %topic_id, posts = posts.len(), total = posts_count, "Built topic view");

	Ok(TopicView { topic, posts, posts_count: u64::try_from(posts_count).unwrap_or_default() })
}

// vim: ts=4
