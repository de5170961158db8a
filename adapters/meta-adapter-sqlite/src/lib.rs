//! SQLite store adapter for forumgate.
//!
//! Implements every store trait of [`forumgate::meta_adapter`] and the
//! queueing [`TopicRetriever`] on top of a single SQLite database file
//! (`meta.db`) in the configured directory.

#![forbid(unsafe_code)]

mod admin;
mod content;
mod credential;
mod embed;
mod mailing;
mod notification;
mod schema;
mod unsubscribe;
mod utils;

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use forumgate::meta_adapter::*;
use forumgate::prelude::*;
use forumgate::retriever::{RetrieveOptions, TopicRetriever};
use forumgate::types::NotificationLevel;

pub use admin::{CreatePost, CreateTopic, CreateUnsubscribeKey, CreateUser};
pub use embed::RetrievalRequest;

use crate::utils::inspect;

#[derive(Debug, Clone)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		tokio::fs::create_dir_all(path.as_ref()).await?;

		let db_path = path.as_ref().join("meta.db");
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(&db_path)
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

		schema::init_db(&db).await.inspect_err(inspect).map_err(|_| Error::DbError)?;
		info!("Meta database opened: {}", db_path.display());

		Ok(Self { db })
	}

	// Record management
	//*******************
	pub async fn create_user(&self, user: &CreateUser<'_>) -> ClResult<UserId> {
		admin::create_user(&self.db, user).await
	}

	pub async fn create_topic(&self, topic: &CreateTopic<'_>) -> ClResult<TopicId> {
		admin::create_topic(&self.db, topic).await
	}

	pub async fn create_post(&self, post: &CreatePost<'_>) -> ClResult<PostId> {
		admin::create_post(&self.db, post).await
	}

	pub async fn create_unsubscribe_key(&self, key: &CreateUnsubscribeKey<'_>) -> ClResult<()> {
		admin::create_unsubscribe_key(&self.db, key).await
	}

	pub async fn create_embeddable_host(
		&self,
		host: &str,
		class_name: Option<&str>,
	) -> ClResult<i64> {
		admin::create_embeddable_host(&self.db, host, class_name).await
	}

	pub async fn create_topic_embed(
		&self,
		embed_url: &str,
		topic_id: TopicId,
		post_id: PostId,
	) -> ClResult<()> {
		admin::create_topic_embed(&self.db, embed_url, topic_id, post_id).await
	}

	/// Store an API key. `user_id: None` creates a master key.
	pub async fn create_api_key(
		&self,
		key: &str,
		user_id: Option<UserId>,
		description: Option<&str>,
	) -> ClResult<()> {
		credential::create_api_key(&self.db, key, user_id, description).await
	}

	pub async fn create_session(&self, token: &str, user_id: UserId) -> ClResult<()> {
		credential::create_session(&self.db, token, user_id).await
	}

	pub async fn set_topic_level(
		&self,
		user_id: UserId,
		topic_id: TopicId,
		level: NotificationLevel,
	) -> ClResult<()> {
		notification::set_topic_level(&self.db, user_id, topic_id, level).await
	}

	pub async fn set_category_level(
		&self,
		user_id: UserId,
		category_id: CategoryId,
		level: NotificationLevel,
	) -> ClResult<()> {
		notification::set_category_level(&self.db, user_id, category_id, level).await
	}

	/// Pending retrieval requests, oldest first
	pub async fn list_retrieval_requests(&self) -> ClResult<Vec<RetrievalRequest>> {
		embed::list_retrievals(&self.db).await
	}
}

#[async_trait]
impl ForumContentStore for MetaAdapterSqlite {
	async fn read_user(&self, user_id: UserId) -> ClResult<Option<UserRecord>> {
		content::read_user(&self.db, user_id).await
	}

	async fn read_topic(&self, topic_id: TopicId) -> ClResult<Option<TopicRecord>> {
		content::read_topic(&self.db, topic_id).await
	}

	async fn read_post(&self, post_id: PostId) -> ClResult<Option<PostRecord>> {
		content::read_post(&self.db, post_id).await
	}

	async fn build_topic_view(
		&self,
		topic_id: TopicId,
		opts: &TopicViewOptions<'_>,
	) -> ClResult<TopicView> {
		content::build_topic_view(&self.db, topic_id, opts).await
	}
}

#[async_trait]
impl UnsubscribeKeyRegistry for MetaAdapterSqlite {
	async fn read_unsubscribe_key(&self, key: &str) -> ClResult<Option<UnsubscribeKey>> {
		unsubscribe::read(&self.db, key).await
	}
}

#[async_trait]
impl NotificationStateStore for MetaAdapterSqlite {
	async fn read_topic_level(
		&self,
		user_id: UserId,
		topic_id: TopicId,
	) -> ClResult<Option<NotificationLevel>> {
		notification::read_topic_level(&self.db, user_id, topic_id).await
	}

	async fn read_category_level(
		&self,
		user_id: UserId,
		category_id: CategoryId,
	) -> ClResult<Option<NotificationLevel>> {
		notification::read_category_level(&self.db, user_id, category_id).await
	}

	async fn topic_users_exist(&self, filter: &TopicUserFilter<'_>) -> ClResult<bool> {
		Ok(notification::count_topic_users(&self.db, filter).await? > 0)
	}

	async fn count_topic_users(&self, filter: &TopicUserFilter<'_>) -> ClResult<u64> {
		notification::count_topic_users(&self.db, filter).await
	}

	async fn update_topic_users(
		&self,
		filter: &TopicUserFilter<'_>,
		level: NotificationLevel,
	) -> ClResult<u64> {
		notification::update_topic_users(&self.db, filter, level).await
	}

	async fn category_users_exist(&self, filter: &CategoryUserFilter<'_>) -> ClResult<bool> {
		notification::category_users_exist(&self.db, filter).await
	}

	async fn delete_category_users(&self, filter: &CategoryUserFilter<'_>) -> ClResult<u64> {
		notification::delete_category_users(&self.db, filter).await
	}

	async fn unwatch_category(
		&self,
		user_id: UserId,
		category_id: CategoryId,
	) -> ClResult<CategoryUnwatch> {
		notification::unwatch_category(&self.db, user_id, category_id).await
	}
}

#[async_trait]
impl MailingPreferenceStore for MetaAdapterSqlite {
	async fn read_mailing_preferences(&self, user_id: UserId) -> ClResult<MailingPreferences> {
		mailing::read(&self.db, user_id).await
	}

	async fn update_mailing_preferences(
		&self,
		user_id: UserId,
		update: &UpdateMailingPreferences,
	) -> ClResult<()> {
		mailing::update(&self.db, user_id, update).await
	}
}

#[async_trait]
impl EmbeddableHostRegistry for MetaAdapterSqlite {
	async fn list_embeddable_hosts(&self) -> ClResult<Vec<EmbeddableHost>> {
		embed::list_hosts(&self.db).await
	}
}

#[async_trait]
impl TopicEmbedIndex for MetaAdapterSqlite {
	async fn read_topic_embed(&self, embed_url: &str) -> ClResult<Option<TopicEmbed>> {
		embed::read_topic_embed(&self.db, embed_url).await
	}
}

#[async_trait]
impl CredentialStore for MetaAdapterSqlite {
	async fn verify_api_key(&self, key: &str, username: &str) -> ClResult<Option<UserRecord>> {
		credential::verify_api_key(&self.db, key, username).await
	}

	async fn read_session_user(&self, token: &str) -> ClResult<Option<UserId>> {
		credential::read_session_user(&self.db, token).await
	}
}

/// Queues the request for the importer; never fetches in-process
#[async_trait]
impl TopicRetriever for MetaAdapterSqlite {
	async fn retrieve(&self, embed_url: &str, opts: &RetrieveOptions) -> ClResult<()> {
		embed::queue_retrieval(&self.db, embed_url, opts.author_username.as_deref()).await
	}
}

// vim: ts=4
