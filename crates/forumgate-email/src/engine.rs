//! Unsubscribe engine
//!
//! An unsubscribe key is a bearer capability: whoever holds it may change the
//! notification preferences of the key's owner. A logged-in session is only
//! used to warn when the link belongs to somebody else.

use serde::{Deserialize, Deserializer, Serialize};
use serde_with::skip_serializing_none;
use url::{Url, form_urlencoded};

use forumgate_types::meta_adapter::{
	ForumContentStore, MailingPreferenceStore, NotificationStateStore, TopicRecord,
	TopicUserFilter, UnsubscribeKey, UnsubscribeKeyRegistry, UnsubscribeKeyType,
	UpdateMailingPreferences, UserRecord,
};
use forumgate_types::types::NotificationLevel;

use crate::prelude::*;

/// Who and what an unsubscribe key points at
#[derive(Debug, Clone)]
pub struct UnsubscribeTarget {
	pub key: UnsubscribeKey,
	pub user: UserRecord,
	pub topic: Option<TopicRecord>,
}

/// Resolve a key to its owner and topic.
///
/// The topic is taken from the key's post if that post and its topic still
/// exist, from the key's own topic reference otherwise.
pub async fn resolve(app: &App, token: &str) -> ClResult<UnsubscribeTarget> {
	let meta = &app.meta_adapter;
	let key = meta.read_unsubscribe_key(token).await?.ok_or(Error::NotFound)?;
	let user_id = key.user_id.ok_or(Error::NotFound)?;
	let user = meta.read_user(user_id).await?.ok_or(Error::NotFound)?;

	let mut topic = None;
	if let Some(post_id) = key.post_id
		&& let Some(post) = meta.read_post(post_id).await?
	{
		topic = meta.read_topic(post.topic_id).await?;
	}
	if topic.is_none()
		&& let Some(topic_id) = key.topic_id
	{
		topic = meta.read_topic(topic_id).await?;
	}

	Ok(UnsubscribeTarget { key, user, topic })
}

// Preview //
//*********//
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifferentUser {
	/// Display name of the key's owner
	pub name: Box<str>,
	/// Where "continue anyway" leads back to
	pub return_url: Box<str>,
}

/// Everything the confirmation screen needs
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnsubscribePreview {
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub not_found: bool,
	pub username: Option<Box<str>>,
	pub key_type: Option<UnsubscribeKeyType>,
	pub topic: Option<TopicRecord>,
	pub different_user: Option<DifferentUser>,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub watching_topic: bool,
	/// Only present while the owner watches the topic's whole category
	pub watched_count: Option<u64>,
}

impl UnsubscribePreview {
	pub fn not_found() -> Self {
		Self { not_found: true, ..Default::default() }
	}
}

pub async fn preview(
	app: &App,
	token: &str,
	session_user: Option<UserId>,
	request_url: &str,
) -> ClResult<UnsubscribePreview> {
	let target = match resolve(app, token).await {
		Ok(target) => target,
		Err(Error::NotFound) => return Ok(UnsubscribePreview::not_found()),
		Err(err) => return Err(err),
	};
	let meta = &app.meta_adapter;
	let user_id = target.user.user_id;

	let different_user = session_user.filter(|id| *id != user_id).map(|_| DifferentUser {
		name: target.user.display_name().into(),
		return_url: request_url.into(),
	});

	let mut watching_topic = false;
	let mut watched_count = None;
	if let Some(topic) = &target.topic {
		watching_topic = meta.read_topic_level(user_id, topic.topic_id).await?
			== Some(NotificationLevel::Watching);

		if let Some(category_id) = topic.category_id {
			let category_level = meta.read_category_level(user_id, category_id).await?;
			if category_level.is_some_and(|level| meta.watching_levels().contains(&level)) {
				let filter = TopicUserFilter::user(user_id)
					.category(category_id)
					.levels(&[NotificationLevel::Watching]);
				watched_count = Some(meta.count_topic_users(&filter).await?);
			}
		}
	}

	Ok(UnsubscribePreview {
		not_found: false,
		username: Some(target.user.username),
		key_type: Some(target.key.key_type),
		topic: target.topic,
		different_user,
		watching_topic,
		watched_count,
	})
}

// Apply //
//*******//
/// Parameter values that count as "off"
fn is_truthy(value: &str) -> bool {
	!matches!(value.trim(), "" | "0" | "false" | "off")
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<String>::deserialize(deserializer)?;
	Ok(value.is_some_and(|v| is_truthy(&v)))
}

/// The requested changes, each independently optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct UnsubscribeToggles {
	#[serde(default, deserialize_with = "truthy")]
	pub unwatch_topic: bool,
	#[serde(default, deserialize_with = "truthy")]
	pub unwatch_category: bool,
	#[serde(default, deserialize_with = "truthy")]
	pub mute_topic: bool,
	#[serde(default, deserialize_with = "truthy")]
	pub disable_mailing_list: bool,
	#[serde(default, deserialize_with = "truthy")]
	pub disable_digest_emails: bool,
	#[serde(default, deserialize_with = "truthy")]
	pub unsubscribe_all: bool,
}

impl UnsubscribeToggles {
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}

	fn mailing_update(&self) -> UpdateMailingPreferences {
		if self.unsubscribe_all {
			return UpdateMailingPreferences {
				mailing_list_mode: Some(false),
				email_digests: Some(false),
				email_always: Some(false),
				email_direct: Some(false),
				email_private_messages: Some(false),
			};
		}
		UpdateMailingPreferences {
			mailing_list_mode: self.disable_mailing_list.then_some(false),
			email_digests: self.disable_digest_emails.then_some(false),
			..Default::default()
		}
	}
}

#[derive(Debug, Clone)]
pub struct ApplyResult {
	/// At least one requested toggle had something to act on
	pub updated: bool,
	pub key: Box<str>,
	pub topic: Option<TopicRecord>,
	pub email: Box<str>,
}

/// Apply the requested toggles for the key's owner.
///
/// Topic toggles run in the order unwatch, unwatch category, mute, so a
/// request asking for both unwatch and mute ends up muted. Each toggle is
/// atomic on its own; there is no transaction spanning toggles.
pub async fn apply(app: &App, token: &str, toggles: &UnsubscribeToggles) -> ClResult<ApplyResult> {
	let target = resolve(app, token).await?;
	let meta = &app.meta_adapter;
	let user_id = target.user.user_id;
	let mut updated = false;

	if let Some(topic) = &target.topic {
		let topic_filter = TopicUserFilter::user(user_id).topic(topic.topic_id);

		if toggles.unwatch_topic {
			meta.update_topic_users(&topic_filter, NotificationLevel::Tracking).await?;
			updated = true;
		}

		if toggles.unwatch_category
			&& let Some(category_id) = topic.category_id
		{
			let res = meta.unwatch_category(user_id, category_id).await?;
			debug!(
				user_id = %user_id,
				category_id = %category_id,
				demoted = res.demoted_topics,
				removed = res.removed_preferences,
				"Category unwatched"
			);
			updated = true;
		}

		if toggles.mute_topic {
			meta.update_topic_users(&topic_filter, NotificationLevel::Muted).await?;
			updated = true;
		}
	}

	let mailing = toggles.mailing_update();
	if !mailing.is_empty() {
		meta.update_mailing_preferences(user_id, &mailing).await?;
		updated = true;
	}

	info!(
		user_id = %user_id,
		topic_id = ?target.topic.as_ref().map(|t| t.topic_id),
		updated,
		?toggles,
		"Applied unsubscribe"
	);

	Ok(ApplyResult { updated, key: target.key.key, topic: target.topic, email: target.user.email })
}

// Redirects //
//***********//
/// Confirmation page URL for an applied change
pub fn unsubscribed_url(base_path: &str, topic_id: Option<TopicId>, email: &str) -> String {
	let mut query = form_urlencoded::Serializer::new(String::new());
	if let Some(topic_id) = topic_id {
		query.append_pair("topic_id", &topic_id.to_string());
	}
	query.append_pair("email", email);
	format!("{}/email/unsubscribed?{}", base_path, query.finish())
}

/// Where to send the browser after `apply`.
///
/// Without changes the user goes back where they came from. Only same-host
/// referrers are followed; otherwise the key's own page is used.
pub fn redirect_target(
	base_path: &str,
	result: &ApplyResult,
	referer: Option<&str>,
	host: Option<&str>,
) -> String {
	if result.updated {
		return unsubscribed_url(base_path, result.topic.as_ref().map(|t| t.topic_id), &result.email);
	}

	let same_host = |referer: &&str| {
		let Ok(url) = Url::parse(referer) else { return false };
		match (url.host_str(), host) {
			(Some(ref_host), Some(host)) => {
				let ref_host = match url.port() {
					Some(port) => format!("{ref_host}:{port}"),
					None => ref_host.to_string(),
				};
				ref_host.eq_ignore_ascii_case(host)
			}
			_ => false,
		}
	};

	referer
		.filter(same_host)
		.map_or_else(|| format!("{}/email/unsubscribe/{}", base_path, result.key), str::to_owned)
}

// Confirmation and preferences //
//******************************//
#[skip_serializing_none]
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnsubscribedInfo {
	pub email: Option<Box<str>>,
	pub topic: Option<TopicRecord>,
}

/// Data for the page shown after a successful unsubscribe
pub async fn unsubscribed(
	app: &App,
	topic_id: Option<&str>,
	email: Option<&str>,
) -> ClResult<UnsubscribedInfo> {
	let topic = match topic_id.and_then(|id| id.trim().parse::<i64>().ok()) {
		Some(id) => app.meta_adapter.read_topic(TopicId(id)).await?,
		None => None,
	};

	Ok(UnsubscribedInfo { email: email.map(Into::into), topic })
}

/// The logged-in user's email preferences page
pub async fn preferences_url(app: &App, session_user: Option<UserId>) -> ClResult<String> {
	let user_id = session_user.ok_or(Error::PermissionDenied)?;
	let user = app.meta_adapter.read_user(user_id).await?.ok_or(Error::NotFound)?;
	Ok(app.url(&format!("/u/{}/preferences/emails", user.username)))
}


// vim: ts=4
