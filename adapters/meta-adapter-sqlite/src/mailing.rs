//! Per-user email delivery flags

use sqlx::{Row, SqlitePool};

use forumgate::meta_adapter::{MailingPreferences, UpdateMailingPreferences};
use forumgate::prelude::*;

use crate::utils::db_err;

pub(crate) async fn read(db: &SqlitePool, user_id: UserId) -> ClResult<MailingPreferences> {
	let row = sqlx::query(
		"SELECT mailing_list_mode, email_digests, email_always, email_direct, email_private_messages
		FROM user_options WHERE user_id = ?",
	)
	.bind(user_id.0)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	let Some(row) = row else {
		return Ok(MailingPreferences::default());
	};

	Ok(MailingPreferences {
		mailing_list_mode: row.try_get("mailing_list_mode").map_err(db_err)?,
		email_digests: row.try_get("email_digests").map_err(db_err)?,
		email_always: row.try_get("email_always").map_err(db_err)?,
		email_direct: row.try_get("email_direct").map_err(db_err)?,
		email_private_messages: row.try_get("email_private_messages").map_err(db_err)?,
	})
}

pub(crate) async fn update(
	db: &SqlitePool,
	user_id: UserId,
	update: &UpdateMailingPreferences,
) -> ClResult<()> {
	if update.is_empty() {
		return Ok(());
	}

	let mut tx = db.begin().await.map_err(db_err)?;

	sqlx::query("INSERT OR IGNORE INTO user_options (user_id) VALUES (?)")
		.bind(user_id.0)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;

	sqlx::query(
		"UPDATE user_options SET
			mailing_list_mode = coalesce(?, mailing_list_mode),
			email_digests = coalesce(?, email_digests),
			email_always = coalesce(?, email_always),
			email_direct = coalesce(?, email_direct),
			email_private_messages = coalesce(?, email_private_messages)
		WHERE user_id = ?",
	)
	.bind(update.mailing_list_mode)
	.bind(update.email_digests)
	.bind(update.email_always)
	.bind(update.email_direct)
	.bind(update.email_private_messages)
	.bind(user_id.0)
	.execute(&mut *tx)
	.await
	.map_err(db_err)?;

	tx.commit().await.map_err(db_err)?;
	debug!(user_id = %user_id, ?update, "Mailing preferences updated");

	Ok(())
}

// vim: ts=4
