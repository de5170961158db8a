//! Unsubscribe key lookup

use sqlx::{Row, SqlitePool};

use forumgate::meta_adapter::{UnsubscribeKey, UnsubscribeKeyType};
use forumgate::prelude::*;

use crate::utils::db_err;

pub(crate) async fn read(db: &SqlitePool, key: &str) -> ClResult<Option<UnsubscribeKey>> {
	let row = sqlx::query(
		"SELECT key, user_id, post_id, topic_id, key_type FROM unsubscribe_keys WHERE key = ?",
	)
	.bind(key)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	row.map(|row| {
		Ok(UnsubscribeKey {
			key: row.try_get::<String, _>("key")?.into(),
			user_id: row.try_get::<Option<i64>, _>("user_id")?.map(UserId),
			post_id: row.try_get::<Option<i64>, _>("post_id")?.map(PostId),
			topic_id: row.try_get::<Option<i64>, _>("topic_id")?.map(TopicId),
			key_type: UnsubscribeKeyType::parse(row.try_get("key_type")?),
		})
	})
	.transpose()
	.map_err(db_err)
}

// vim: ts=4
