//! Shared utilities for SQLite adapter
//!
//! Helper functions and error mapping used across all domain modules.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use forumgate::prelude::*;
use forumgate::types::NotificationLevel;

/// Log database error for debugging
pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

/// Log and collapse any sqlx error into `Error::DbError`
pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	Error::DbError
}

/// Append ` IN (?, ?, ...)` with the numeric values of `levels`
pub(crate) fn push_levels(
	query: &mut sqlx::QueryBuilder<'_, sqlx::Sqlite>,
	levels: &[NotificationLevel],
) {
	query.push(" IN (");
	let mut separated = query.separated(", ");
	for level in levels {
		separated.push_bind(level.as_i64());
	}
	separated.push_unseparated(")");
}

/// Decode a stored notification level
pub(crate) fn parse_level(value: i64) -> ClResult<NotificationLevel> {
	NotificationLevel::from_i64(value).ok_or_else(|| {
		warn!(value, "Invalid notification level in database");
		Error::DbError
	})
}

/// Hash a bearer secret (API key, session token) for storage and lookup
pub(crate) fn hash_secret(secret: &str) -> String {
	URL_SAFE_NO_PAD.encode(Sha256::digest(secret.as_bytes()))
}


// vim: ts=4
