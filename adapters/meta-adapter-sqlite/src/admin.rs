//! Record management
//!
//! The gateway itself never creates forum content. These writers exist for
//! the import tooling and for seeding test databases.

use sqlx::SqlitePool;

use forumgate::meta_adapter::UnsubscribeKeyType;
use forumgate::prelude::*;
use forumgate::types::normalize_embed_url;

use crate::utils::db_err;

#[derive(Debug, Clone, Default)]
pub struct CreateUser<'a> {
	pub username: &'a str,
	pub name: Option<&'a str>,
	pub email: &'a str,
	pub admin: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CreateTopic<'a> {
	pub title: &'a str,
	pub slug: &'a str,
	pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone)]
pub struct CreatePost<'a> {
	pub topic_id: TopicId,
	pub post_number: i32,
	pub user_id: Option<UserId>,
	pub cooked: &'a str,
	pub hidden: bool,
	pub deleted: bool,
}

#[derive(Debug, Clone)]
pub struct CreateUnsubscribeKey<'a> {
	pub key: &'a str,
	pub user_id: Option<UserId>,
	pub post_id: Option<PostId>,
	pub topic_id: Option<TopicId>,
	pub key_type: UnsubscribeKeyType,
}

pub(crate) async fn create_user(db: &SqlitePool, user: &CreateUser<'_>) -> ClResult<UserId> {
	let user_id: i64 = sqlx::query_scalar(
		"INSERT INTO users (username, name, email, admin) VALUES (?, ?, ?, ?) RETURNING user_id",
	)
	.bind(user.username)
	.bind(user.name)
	.bind(user.email)
	.bind(user.admin)
	.fetch_one(db)
	.await
	.map_err(db_err)?;

	Ok(UserId(user_id))
}

pub(crate) async fn create_topic(db: &SqlitePool, topic: &CreateTopic<'_>) -> ClResult<TopicId> {
	let topic_id: i64 = sqlx::query_scalar(
		"INSERT INTO topics (title, slug, category_id) VALUES (?, ?, ?) RETURNING topic_id",
	)
	.bind(topic.title)
	.bind(topic.slug)
	.bind(topic.category_id.map(|id| id.0))
	.fetch_one(db)
	.await
	.map_err(db_err)?;

	Ok(TopicId(topic_id))
}

pub(crate) async fn create_post(db: &SqlitePool, post: &CreatePost<'_>) -> ClResult<PostId> {
	let deleted_at = post.deleted.then(|| Timestamp::now().0);
	let post_id: i64 = sqlx::query_scalar(
		"INSERT INTO posts (topic_id, post_number, user_id, cooked, hidden, deleted_at)
		VALUES (?, ?, ?, ?, ?, ?) RETURNING post_id",
	)
	.bind(post.topic_id.0)
	.bind(post.post_number)
	.bind(post.user_id.map(|id| id.0))
	.bind(post.cooked)
	.bind(post.hidden)
	.bind(deleted_at)
	.fetch_one(db)
	.await
	.map_err(db_err)?;

	Ok(PostId(post_id))
}

pub(crate) async fn create_unsubscribe_key(
	db: &SqlitePool,
	key: &CreateUnsubscribeKey<'_>,
) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO unsubscribe_keys (key, user_id, post_id, topic_id, key_type)
		VALUES (?, ?, ?, ?, ?)",
	)
	.bind(key.key)
	.bind(key.user_id.map(|id| id.0))
	.bind(key.post_id.map(|id| id.0))
	.bind(key.topic_id.map(|id| id.0))
	.bind(key.key_type.as_str())
	.execute(db)
	.await
	.map_err(db_err)?;

	Ok(())
}

pub(crate) async fn create_embeddable_host(
	db: &SqlitePool,
	host: &str,
	class_name: Option<&str>,
) -> ClResult<i64> {
	let host_id: i64 = sqlx::query_scalar(
		"INSERT INTO embeddable_hosts (host, class_name) VALUES (?, ?) RETURNING host_id",
	)
	.bind(host)
	.bind(class_name)
	.fetch_one(db)
	.await
	.map_err(db_err)?;

	info!(host, "Embeddable host registered");
	Ok(host_id)
}

pub(crate) async fn create_topic_embed(
	db: &SqlitePool,
	embed_url: &str,
	topic_id: TopicId,
	post_id: PostId,
) -> ClResult<()> {
	let embed_url = normalize_embed_url(embed_url);
	let mut tx = db.begin().await.map_err(db_err)?;

	sqlx::query(
		"INSERT INTO topic_embeds (embed_url, topic_id, post_id) VALUES (?, ?, ?)
		ON CONFLICT (embed_url) DO UPDATE SET topic_id = excluded.topic_id, post_id = excluded.post_id",
	)
	.bind(embed_url)
	.bind(topic_id.0)
	.bind(post_id.0)
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;

	// A completed import satisfies any pending request
	sqlx::query("DELETE FROM retrieval_requests WHERE embed_url = ?")
		.bind(embed_url)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;

	tx.commit().await.map_err(db_err)?;
	Ok(())
}

// vim: ts=4
