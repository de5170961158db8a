//! Store adapter traits for the notification, content and embed subsystems.
//!
//! The unsubscribe engine and the embed gateway only talk to storage through
//! these traits. Each trait is a thin slice of the forum's data model; an
//! adapter normally implements all of them and is used as a [`MetaAdapter`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::prelude::*;
use crate::types::{CATEGORY_WATCHING_LEVELS, NotificationLevel};

// Forum content //
//***************//
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
	pub user_id: UserId,
	pub username: Box<str>,
	pub name: Option<Box<str>>,
	pub email: Box<str>,
	pub admin: bool,
}

impl UserRecord {
	/// Full name if set, username otherwise
	pub fn display_name(&self) -> &str {
		match self.name.as_deref() {
			Some(name) if !name.trim().is_empty() => name,
			_ => &self.username,
		}
	}
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRecord {
	#[serde(rename = "id")]
	pub topic_id: TopicId,
	pub title: Box<str>,
	pub slug: Box<str>,
	pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
	pub post_id: PostId,
	pub topic_id: TopicId,
	pub post_number: i32,
	/// `None` once the author account was deleted
	pub user_id: Option<UserId>,
}

/// Options for building the bounded post list of a topic
#[derive(Debug, Clone, Default)]
pub struct TopicViewOptions<'a> {
	pub limit: u32,
	/// Skip post number 1 (the topic body)
	pub exclude_first: bool,
	pub exclude_deleted_users: bool,
	pub exclude_hidden: bool,
	/// Only include posts written by this user
	pub author_username: Option<&'a str>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
	pub post_id: PostId,
	pub post_number: i32,
	pub username: Option<Box<str>>,
	pub name: Option<Box<str>>,
	/// Rendered (trusted) HTML body
	pub cooked: Box<str>,
	pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicView {
	pub topic: TopicRecord,
	pub posts: Vec<PostView>,
	/// Number of visible replies, regardless of the limit
	pub posts_count: u64,
}

#[async_trait]
pub trait ForumContentStore: Debug + Send + Sync {
	async fn read_user(&self, user_id: UserId) -> ClResult<Option<UserRecord>>;
	async fn read_topic(&self, topic_id: TopicId) -> ClResult<Option<TopicRecord>>;
	async fn read_post(&self, post_id: PostId) -> ClResult<Option<PostRecord>>;

	/// Build a filtered, bounded view of a topic's posts.
	///
	/// Returns `Error::NotFound` if the topic does not exist.
	async fn build_topic_view(
		&self,
		topic_id: TopicId,
		opts: &TopicViewOptions<'_>,
	) -> ClResult<TopicView>;
}

// Unsubscribe keys //
//******************//
/// Why an unsubscribe key was issued
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsubscribeKeyType {
	Digest,
	MailingList,
	Topic,
	#[serde(untagged)]
	Other(Box<str>),
}

impl UnsubscribeKeyType {
	pub fn as_str(&self) -> &str {
		match self {
			Self::Digest => "digest",
			Self::MailingList => "mailing_list",
			Self::Topic => "topic",
			Self::Other(s) => s,
		}
	}

	pub fn parse(s: &str) -> Self {
		match s {
			"digest" => Self::Digest,
			"mailing_list" => Self::MailingList,
			"topic" => Self::Topic,
			other => Self::Other(other.into()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsubscribeKey {
	pub key: Box<str>,
	/// May be absent if the owning account no longer exists
	pub user_id: Option<UserId>,
	pub post_id: Option<PostId>,
	pub topic_id: Option<TopicId>,
	pub key_type: UnsubscribeKeyType,
}

#[async_trait]
pub trait UnsubscribeKeyRegistry: Debug + Send + Sync {
	async fn read_unsubscribe_key(&self, key: &str) -> ClResult<Option<UnsubscribeKey>>;
}

// Notification state //
//********************//
/// Selects (user, topic) preference rows. Empty `levels` matches any level.
#[derive(Debug, Clone, Copy)]
pub struct TopicUserFilter<'a> {
	pub user_id: UserId,
	pub topic_id: Option<TopicId>,
	/// Restrict to topics in this category
	pub category_id: Option<CategoryId>,
	pub levels: &'a [NotificationLevel],
}

impl<'a> TopicUserFilter<'a> {
	pub fn user(user_id: UserId) -> Self {
		Self { user_id, topic_id: None, category_id: None, levels: &[] }
	}

	pub fn topic(mut self, topic_id: TopicId) -> Self {
		self.topic_id = Some(topic_id);
		self
	}

	pub fn category(mut self, category_id: CategoryId) -> Self {
		self.category_id = Some(category_id);
		self
	}

	pub fn levels(mut self, levels: &'a [NotificationLevel]) -> Self {
		self.levels = levels;
		self
	}
}

/// Selects (user, category) preference rows. Empty `levels` matches any level.
#[derive(Debug, Clone, Copy)]
pub struct CategoryUserFilter<'a> {
	pub user_id: UserId,
	pub category_id: CategoryId,
	pub levels: &'a [NotificationLevel],
}

/// Outcome of dropping a category watch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryUnwatch {
	/// Topic preferences demoted from watching to tracking
	pub demoted_topics: u64,
	/// Category preference rows removed
	pub removed_preferences: u64,
}

#[async_trait]
pub trait NotificationStateStore: Debug + Send + Sync {
	async fn read_topic_level(
		&self,
		user_id: UserId,
		topic_id: TopicId,
	) -> ClResult<Option<NotificationLevel>>;
	async fn read_category_level(
		&self,
		user_id: UserId,
		category_id: CategoryId,
	) -> ClResult<Option<NotificationLevel>>;

	async fn topic_users_exist(&self, filter: &TopicUserFilter<'_>) -> ClResult<bool>;
	async fn count_topic_users(&self, filter: &TopicUserFilter<'_>) -> ClResult<u64>;
	/// Set the level of every matching row, returns the number of rows changed
	async fn update_topic_users(
		&self,
		filter: &TopicUserFilter<'_>,
		level: NotificationLevel,
	) -> ClResult<u64>;

	async fn category_users_exist(&self, filter: &CategoryUserFilter<'_>) -> ClResult<bool>;
	async fn delete_category_users(&self, filter: &CategoryUserFilter<'_>) -> ClResult<u64>;

	/// Demote the user's watched topics in a category to tracking and delete
	/// their watching-tier category preference, as one atomic unit.
	async fn unwatch_category(
		&self,
		user_id: UserId,
		category_id: CategoryId,
	) -> ClResult<CategoryUnwatch>;

	/// Category levels considered "watching"
	fn watching_levels(&self) -> &'static [NotificationLevel] {
		CATEGORY_WATCHING_LEVELS
	}
}

// Mailing preferences //
//*********************//
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailingPreferences {
	pub mailing_list_mode: bool,
	pub email_digests: bool,
	pub email_always: bool,
	pub email_direct: bool,
	pub email_private_messages: bool,
}

impl Default for MailingPreferences {
	fn default() -> Self {
		Self {
			mailing_list_mode: false,
			email_digests: true,
			email_always: false,
			email_direct: true,
			email_private_messages: true,
		}
	}
}

/// Partial update of mailing preferences. `None` leaves a flag untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateMailingPreferences {
	pub mailing_list_mode: Option<bool>,
	pub email_digests: Option<bool>,
	pub email_always: Option<bool>,
	pub email_direct: Option<bool>,
	pub email_private_messages: Option<bool>,
}

impl UpdateMailingPreferences {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

#[async_trait]
pub trait MailingPreferenceStore: Debug + Send + Sync {
	async fn read_mailing_preferences(&self, user_id: UserId) -> ClResult<MailingPreferences>;
	async fn update_mailing_preferences(
		&self,
		user_id: UserId,
		update: &UpdateMailingPreferences,
	) -> ClResult<()>;
}

// Embedding //
//***********//
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddableHost {
	pub host_id: i64,
	/// Host with optional scheme and path prefix, e.g. `https://example.com/blog`
	pub host: Box<str>,
	pub class_name: Option<Box<str>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEmbed {
	pub embed_url: Box<str>,
	pub topic_id: TopicId,
	pub post_id: PostId,
}

#[async_trait]
pub trait EmbeddableHostRegistry: Debug + Send + Sync {
	/// All registered hosts in registration order
	async fn list_embeddable_hosts(&self) -> ClResult<Vec<EmbeddableHost>>;
}

#[async_trait]
pub trait TopicEmbedIndex: Debug + Send + Sync {
	async fn read_topic_embed(&self, embed_url: &str) -> ClResult<Option<TopicEmbed>>;
}

// Credentials //
//*************//
#[async_trait]
pub trait CredentialStore: Debug + Send + Sync {
	/// Resolve an API key + acting username pair to the acting user.
	///
	/// Master keys (not bound to a user) may act as any existing user; user
	/// keys only as their owner. Returns `None` for any mismatch.
	async fn verify_api_key(&self, key: &str, username: &str) -> ClResult<Option<UserRecord>>;

	/// Resolve a bearer session token to its user
	async fn read_session_user(&self, token: &str) -> ClResult<Option<UserId>>;
}

/// Everything a storage backend has to provide
pub trait MetaAdapter:
	ForumContentStore
	+ UnsubscribeKeyRegistry
	+ NotificationStateStore
	+ MailingPreferenceStore
	+ EmbeddableHostRegistry
	+ TopicEmbedIndex
	+ CredentialStore
{
}

impl<T> MetaAdapter for T where
	T: ForumContentStore
		+ UnsubscribeKeyRegistry
		+ NotificationStateStore
		+ MailingPreferenceStore
		+ EmbeddableHostRegistry
		+ TopicEmbedIndex
		+ CredentialStore
{
}


// vim: ts=4
