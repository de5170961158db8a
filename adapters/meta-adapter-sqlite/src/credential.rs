//! API keys and session tokens
//!
//! Only hashes of secrets are stored, lookups hash the presented value.

use sqlx::{Row, SqlitePool};

use forumgate::meta_adapter::UserRecord;
use forumgate::prelude::*;

use crate::content::user_from_row;
use crate::utils::{db_err, hash_secret};

pub(crate) async fn verify_api_key(
	db: &SqlitePool,
	key: &str,
	username: &str,
) -> ClResult<Option<UserRecord>> {
	if key.is_empty() || username.is_empty() {
		return Ok(None);
	}

	let row = sqlx::query(
		"SELECT u.user_id, u.username, u.name, u.email, u.admin
		FROM api_keys k, users u
		WHERE k.key_hash = ? AND u.username = ?
		AND (k.user_id IS NULL OR k.user_id = u.user_id)",
	)
	.bind(hash_secret(key))
	.bind(username)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	let user = row.as_ref().map(user_from_row).transpose().map_err(db_err)?;
	if user.is_none() {
		debug!(username, "API key rejected");
	}
	Ok(user)
}

pub(crate) async fn read_session_user(db: &SqlitePool, token: &str) -> ClResult<Option<UserId>> {
	let row = sqlx::query("SELECT user_id FROM user_sessions WHERE token_hash = ?")
		.bind(hash_secret(token))
		.fetch_optional(db)
		.await
		.map_err(db_err)?;

	row.map(|row| row.try_get("user_id").map(UserId)).transpose().map_err(db_err)
}

pub(crate) async fn create_api_key(
	db: &SqlitePool,
	key: &str,
	user_id: Option<UserId>,
	description: Option<&str>,
) -> ClResult<()> {
	sqlx::query("INSERT INTO api_keys (key_hash, user_id, description) VALUES (?, ?, ?)")
		.bind(hash_secret(key))
		.bind(user_id.map(|id| id.0))
		.bind(description)
		.execute(db)
		.await
		.map_err(db_err)?;

	Ok(())
}

pub(crate) async fn create_session(db: &SqlitePool, token: &str, user_id: UserId) -> ClResult<()> {
	sqlx::query("INSERT INTO user_sessions (token_hash, user_id) VALUES (?, ?)")
		.bind(hash_secret(token))
		.bind(user_id.0)
		.execute(db)
		.await
		.map_err(db_err)?;

	Ok(())
}

// vim: ts=4
