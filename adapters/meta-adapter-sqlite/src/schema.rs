//! Database schema initialization
//!
//! Creates the forum tables this adapter reads and the preference tables it
//! mutates. Everything is `IF NOT EXISTS` so opening an existing database is
//! a no-op.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Users
	//*******
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
		user_id integer NOT NULL,
		username text NOT NULL COLLATE NOCASE,
		name text,
		email text NOT NULL,
		admin boolean NOT NULL DEFAULT 0,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username ON users(username)")
		.execute(&mut *tx)
		.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS user_options (
		user_id integer NOT NULL,
		mailing_list_mode boolean NOT NULL DEFAULT 0,
		email_digests boolean NOT NULL DEFAULT 1,
		email_always boolean NOT NULL DEFAULT 0,
		email_direct boolean NOT NULL DEFAULT 1,
		email_private_messages boolean NOT NULL DEFAULT 1,
		PRIMARY KEY(user_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS user_sessions (
		token_hash text NOT NULL,
		user_id integer NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(token_hash)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS api_keys (
		key_hash text NOT NULL,
		user_id integer,			-- NULL: master key, may act as any user
		description text,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(key_hash)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Content
	//*********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS topics (
		topic_id integer NOT NULL,
		title text NOT NULL,
		slug text NOT NULL,
		category_id integer,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(topic_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_topics_category ON topics(category_id)")
		.execute(&mut *tx)
		.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS posts (
		post_id integer NOT NULL,
		topic_id integer NOT NULL,
		post_number integer NOT NULL,
		user_id integer,			-- NULL: author account deleted
		cooked text NOT NULL DEFAULT '',
		hidden boolean NOT NULL DEFAULT 0,
		deleted_at datetime,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(post_id)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_posts_topic_number ON posts(topic_id, post_number)",
	)
	.execute(&mut *tx)
	.await?;

	// Notification state
	//********************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS topic_users (
		user_id integer NOT NULL,
		topic_id integer NOT NULL,
		notification_level integer NOT NULL,
		PRIMARY KEY(user_id, topic_id)
	) WITHOUT ROWID",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS category_users (
		user_id integer NOT NULL,
		category_id integer NOT NULL,
		notification_level integer NOT NULL,
		PRIMARY KEY(user_id, category_id)
	) WITHOUT ROWID",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS unsubscribe_keys (
		key text NOT NULL,
		user_id integer,
		post_id integer,
		topic_id integer,
		key_type text NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(key)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Embedding
	//***********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS embeddable_hosts (
		host_id integer PRIMARY KEY AUTOINCREMENT,
		host text NOT NULL,
		class_name text,
		created_at datetime DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS topic_embeds (
		embed_url text NOT NULL COLLATE NOCASE,
		topic_id integer NOT NULL,
		post_id integer NOT NULL,
		created_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(embed_url)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS retrieval_requests (
		embed_url text NOT NULL COLLATE NOCASE,
		author_username text,
		requested_at datetime NOT NULL,
		attempts integer NOT NULL DEFAULT 1,
		PRIMARY KEY(embed_url)
	)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
