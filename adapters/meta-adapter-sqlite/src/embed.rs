//! Embeddable hosts, topic embeds and the retrieval queue
//!
//! The retrieval queue is where [`TopicRetriever::retrieve`] requests end up;
//! an importer process drains it and fills `topic_embeds`.
//!
//! [`TopicRetriever::retrieve`]: forumgate::retriever::TopicRetriever::retrieve

use sqlx::{Row, SqlitePool};

use forumgate::meta_adapter::{EmbeddableHost, TopicEmbed};
use forumgate::prelude::*;

use crate::utils::db_err;

pub(crate) async fn list_hosts(db: &SqlitePool) -> ClResult<Vec<EmbeddableHost>> {
	let rows = sqlx::query("SELECT host_id, host, class_name FROM embeddable_hosts ORDER BY host_id")
		.fetch_all(db)
		.await
		.map_err(db_err)?;

	rows.iter()
		.map(|row| {
			Ok(EmbeddableHost {
				host_id: row.try_get("host_id")?,
				host: row.try_get::<String, _>("host")?.into(),
				class_name: row.try_get::<Option<String>, _>("class_name")?.map(Into::into),
			})
		})
		.collect::<Result<Vec<_>, sqlx::Error>>()
		.map_err(db_err)
}

pub(crate) async fn read_topic_embed(
	db: &SqlitePool,
	embed_url: &str,
) -> ClResult<Option<TopicEmbed>> {
	let row =
		sqlx::query("SELECT embed_url, topic_id, post_id FROM topic_embeds WHERE embed_url = ?")
			.bind(embed_url)
			.fetch_optional(db)
			.await
			.map_err(db_err)?;

	row.map(|row| {
		Ok(TopicEmbed {
			embed_url: row.try_get::<String, _>("embed_url")?.into(),
			topic_id: TopicId(row.try_get("topic_id")?),
			post_id: PostId(row.try_get("post_id")?),
		})
	})
	.transpose()
	.map_err(db_err)
}

/// Queue a retrieval. Repeated requests for the same URL bump `attempts`.
pub(crate) async fn queue_retrieval(
	db: &SqlitePool,
	embed_url: &str,
	author_username: Option<&str>,
) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO retrieval_requests (embed_url, author_username, requested_at) VALUES (?, ?, ?)
		ON CONFLICT (embed_url) DO UPDATE SET
			author_username = coalesce(excluded.author_username, author_username),
			requested_at = excluded.requested_at,
			attempts = attempts + 1",
	)
	.bind(embed_url)
	.bind(author_username)
	.bind(Timestamp::now().0)
	.execute(db)
	.await
	.map_err(db_err)?;

	info!(embed_url, "Topic retrieval queued");
	Ok(())
}

/// Queued retrieval (embed_url, author_username, attempts)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalRequest {
	pub embed_url: Box<str>,
	pub author_username: Option<Box<str>>,
	pub attempts: u32,
}

pub(crate) async fn list_retrievals(db: &SqlitePool) -> ClResult<Vec<RetrievalRequest>> {
	let rows = sqlx::query(
		"SELECT embed_url, author_username, attempts FROM retrieval_requests ORDER BY requested_at",
	)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	rows.iter()
		.map(|row| {
			Ok(RetrievalRequest {
				embed_url: row.try_get::<String, _>("embed_url")?.into(),
				author_username: row
					.try_get::<Option<String>, _>("author_username")?
					.map(Into::into),
				attempts: row.try_get("attempts")?,
			})
		})
		.collect::<Result<Vec<_>, sqlx::Error>>()
		.map_err(db_err)
}

// vim: ts=4
