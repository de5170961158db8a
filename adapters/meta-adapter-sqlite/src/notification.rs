//! Topic and category notification levels
//!
//! All mutations are idempotent: re-applying the same update leaves the
//! tables unchanged and reports zero affected rows.

use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use forumgate::meta_adapter::{CategoryUnwatch, CategoryUserFilter, TopicUserFilter};
use forumgate::prelude::*;
use forumgate::types::{CATEGORY_WATCHING_LEVELS, NotificationLevel};

use crate::utils::{db_err, parse_level, push_levels};

fn push_topic_filter<'a>(query: &mut QueryBuilder<'a, Sqlite>, filter: &TopicUserFilter<'_>) {
	query.push(" WHERE user_id = ");
	query.push_bind(filter.user_id.0);
	if let Some(topic_id) = filter.topic_id {
		query.push(" AND topic_id = ");
		query.push_bind(topic_id.0);
	}
	if let Some(category_id) = filter.category_id {
		query.push(" AND topic_id IN (SELECT topic_id FROM topics WHERE category_id = ");
		query.push_bind(category_id.0);
		query.push(")");
	}
	if !filter.levels.is_empty() {
		query.push(" AND notification_level");
		push_levels(query, filter.levels);
	}
}

fn push_category_filter<'a>(query: &mut QueryBuilder<'a, Sqlite>, filter: &CategoryUserFilter<'_>) {
	query.push(" WHERE user_id = ");
	query.push_bind(filter.user_id.0);
	query.push(" AND category_id = ");
	query.push_bind(filter.category_id.0);
	if !filter.levels.is_empty() {
		query.push(" AND notification_level");
		push_levels(query, filter.levels);
	}
}

pub(crate) async fn read_topic_level(
	db: &SqlitePool,
	user_id: UserId,
	topic_id: TopicId,
) -> ClResult<Option<NotificationLevel>> {
	let level: Option<i64> = sqlx::query_scalar(
		"SELECT notification_level FROM topic_users WHERE user_id = ? AND topic_id = ?",
	)
	.bind(user_id.0)
	.bind(topic_id.0)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	level.map(parse_level).transpose()
}

pub(crate) async fn read_category_level(
	db: &SqlitePool,
	user_id: UserId,
	category_id: CategoryId,
) -> ClResult<Option<NotificationLevel>> {
	let level: Option<i64> = sqlx::query_scalar(
		"SELECT notification_level FROM category_users WHERE user_id = ? AND category_id = ?",
	)
	.bind(user_id.0)
	.bind(category_id.0)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	level.map(parse_level).transpose()
}

pub(crate) async fn count_topic_users(
	db: &SqlitePool,
	filter: &TopicUserFilter<'_>,
) -> ClResult<u64> {
	let mut query = QueryBuilder::new("SELECT count(*) AS cnt FROM topic_users");
	push_topic_filter(&mut query, filter);

	let cnt: i64 = query
		.build()
		.fetch_one(db)
		.await
		.and_then(|row| row.try_get("cnt"))
		.map_err(db_err)?;

	Ok(u64::try_from(cnt).unwrap_or_default())
}

pub(crate) async fn update_topic_users(
	db: &SqlitePool,
	filter: &TopicUserFilter<'_>,
	level: NotificationLevel,
) -> ClResult<u64> {
	let mut query = QueryBuilder::new("UPDATE topic_users SET notification_level = ");
	query.push_bind(level.as_i64());
	push_topic_filter(&mut query, filter);
	query.push(" AND notification_level != ");
	query.push_bind(level.as_i64());

	let res = query.build().execute(db).await.map_err(db_err)?;
	Ok(res.rows_affected())
}

pub(crate) async fn category_users_exist(
	db: &SqlitePool,
	filter: &CategoryUserFilter<'_>,
) -> ClResult<bool> {
	let mut query = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM category_users");
	push_category_filter(&mut query, filter);
	query.push(") AS found");

	query
		.build()
		.fetch_one(db)
		.await
		.and_then(|row| row.try_get("found"))
		.map_err(db_err)
}

pub(crate) async fn delete_category_users(
	db: &SqlitePool,
	filter: &CategoryUserFilter<'_>,
) -> ClResult<u64> {
	let mut query = QueryBuilder::new("DELETE FROM category_users");
	push_category_filter(&mut query, filter);

	let res = query.build().execute(db).await.map_err(db_err)?;
	Ok(res.rows_affected())
}

pub(crate) async fn unwatch_category(
	db: &SqlitePool,
	user_id: UserId,
	category_id: CategoryId,
) -> ClResult<CategoryUnwatch> {
	let mut tx = db.begin().await.map_err(db_err)?;

	let demoted = sqlx::query(
		"UPDATE topic_users SET notification_level = ?
		WHERE user_id = ? AND notification_level = ?
		AND topic_id IN (SELECT topic_id FROM topics WHERE category_id = ?)",
	)
	.bind(NotificationLevel::Tracking.as_i64())
	.bind(user_id.0)
	.bind(NotificationLevel::Watching.as_i64())
	.bind(category_id.0)
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;

	let mut query = QueryBuilder::new("DELETE FROM category_users WHERE user_id = ");
	query.push_bind(user_id.0);
	query.push(" AND category_id = ");
	query.push_bind(category_id.0);
	query.push(" AND notification_level");
	push_levels(&mut query, CATEGORY_WATCHING_LEVELS);
	let removed = query.build().execute(&mut *tx).await.map_err(db_err)?;

	tx.commit().await.map_err(db_err)?;

	Ok(CategoryUnwatch {
		demoted_topics: demoted.rows_affected(),
		removed_preferences: removed.rows_affected(),
	})
}

/// Insert or overwrite a topic preference row
pub(crate) async fn set_topic_level(
	db: &SqlitePool,
	user_id: UserId,
	topic_id: TopicId,
	level: NotificationLevel,
) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO topic_users (user_id, topic_id, notification_level) VALUES (?, ?, ?)
		ON CONFLICT (user_id, topic_id) DO UPDATE SET notification_level = excluded.notification_level",
	)
	.bind(user_id.0)
	.bind(topic_id.0)
	.bind(level.as_i64())
	.execute(db)
	.await
	.map_err(db_err)?;

	Ok(())
}

/// Insert or overwrite a category preference row
pub(crate) async fn set_category_level(
	db: &SqlitePool,
	user_id: UserId,
	category_id: CategoryId,
	level: NotificationLevel,
) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO category_users (user_id, category_id, notification_level) VALUES (?, ?, ?)
		ON CONFLICT (user_id, category_id) DO UPDATE SET notification_level = excluded.notification_level",
	)
	.bind(user_id.0)
	.bind(category_id.0)
	.bind(level.as_i64())
	.execute(db)
	.await
	.map_err(db_err)?;

	Ok(())
}

// vim: ts=4
