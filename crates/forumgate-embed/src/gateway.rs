//! Embed gateway
//!
//! Authorizes the embedding site by its referrer, resolves which topic an
//! embed refers to and builds the bounded post list shown as comments. Topics
//! not yet imported are handed to the retriever and reported as pending.

use serde::Serialize;

use forumgate_core::extract::ApiCredentials;
use forumgate_types::meta_adapter::{
	CredentialStore, EmbeddableHost, EmbeddableHostRegistry, ForumContentStore, TopicEmbedIndex,
	TopicView, TopicViewOptions,
};
use forumgate_types::retriever::{RetrieveOptions, TopicRetriever};
use forumgate_types::types::normalize_embed_url;

use crate::host::{self, Referrer};
use crate::prelude::*;

/// Posts shown in one embed
pub const MAX_EMBED_POSTS: u32 = 100;

/// What an embed request asks for, as received
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbedRequest<'a> {
	pub embed_url: Option<&'a str>,
	/// Raw `topic_id` parameter, parsed here
	pub topic_id: Option<&'a str>,
	pub referrer: Option<&'a str>,
	pub author_username: Option<&'a str>,
}

impl<'a> EmbedRequest<'a> {
	fn embed_url(&self) -> Option<&'a str> {
		self.embed_url.map(normalize_embed_url).filter(|url| !url.is_empty())
	}

	fn topic_id(&self) -> Option<&'a str> {
		self.topic_id.map(str::trim).filter(|id| !id.is_empty())
	}

	fn author_username(&self) -> Option<&'a str> {
		self.author_username.map(str::trim).filter(|name| !name.is_empty())
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedHost {
	/// ` class="NAME"` for the embed container
	pub class_attr: Option<Box<str>>,
}

/// Check the referrer against the embeddable host registry.
///
/// An empty registry denies everything here; callers decide whether an empty
/// registry means open mode.
pub async fn authorize(app: &App, referrer: Option<&str>) -> ClResult<AllowedHost> {
	let hosts = app.meta_adapter.list_embeddable_hosts().await?;
	match_referrer(&hosts, referrer)
}

fn match_referrer(hosts: &[EmbeddableHost], referrer: Option<&str>) -> ClResult<AllowedHost> {
	let Some(referrer_url) = referrer.and_then(Referrer::parse) else {
		debug!(?referrer, "Embed denied: no usable referrer");
		return Err(Error::PermissionDenied);
	};

	match host::find_host(hosts, &referrer_url) {
		Some(allowed) => {
			Ok(AllowedHost { class_attr: host::class_attr(allowed.class_name.as_deref()) })
		}
		None => {
			info!(referrer, "Embed denied: host not registered");
			Err(Error::PermissionDenied)
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicRef {
	pub topic_id: TopicId,
	/// Post the embed URL was imported into, unknown for direct topic ids
	pub post_id: Option<PostId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicLookup {
	Found(TopicRef),
	/// Not imported yet, a retrieval was requested
	Pending,
}

/// Find the topic of an embed. `embed_url` wins when both are given.
pub async fn resolve_topic(
	app: &App,
	embed_url: Option<&str>,
	topic_id: Option<&str>,
	opts: &RetrieveOptions,
) -> ClResult<TopicLookup> {
	let meta = &app.meta_adapter;

	if let Some(embed_url) = embed_url {
		let embed_url = normalize_embed_url(embed_url);
		if let Some(embed) = meta.read_topic_embed(embed_url).await? {
			return Ok(TopicLookup::Found(TopicRef {
				topic_id: embed.topic_id,
				post_id: Some(embed.post_id),
			}));
		}

		info!(embed_url, "Embed URL not indexed, requesting retrieval");
		app.retriever.retrieve(embed_url, opts).await?;
		return Ok(TopicLookup::Pending);
	}

	let Some(topic_id) = topic_id else {
		return Err(Error::MissingParameter("embed_url"));
	};
	let topic_id = topic_id.trim().parse::<i64>().map(TopicId).map_err(|_| Error::NotFound)?;
	let topic = meta.read_topic(topic_id).await?.ok_or(Error::NotFound)?;

	Ok(TopicLookup::Found(TopicRef { topic_id: topic.topic_id, post_id: None }))
}

// Comments //
//**********//
#[derive(Debug, Clone)]
pub enum CommentsPage {
	Topic {
		view: TopicView,
		/// Link to the full discussion
		topic_url: Box<str>,
	},
	Pending,
}

#[derive(Debug, Clone)]
pub struct CommentsOutcome {
	pub class_attr: Option<Box<str>>,
	pub page: CommentsPage,
}

pub async fn render_comments(app: &App, req: &EmbedRequest<'_>) -> ClResult<CommentsOutcome> {
	let embed_url = req.embed_url();
	let topic_id = req.topic_id();
	if embed_url.is_none() && topic_id.is_none() {
		return Err(Error::MissingParameter("embed_url"));
	}

	let hosts = app.meta_adapter.list_embeddable_hosts().await?;
	let allowed = if hosts.is_empty() {
		debug!("No embeddable hosts registered, embedding is open");
		AllowedHost::default()
	} else {
		match_referrer(&hosts, req.referrer)?
	};

	let author = req.author_username();
	let retrieve_opts = RetrieveOptions { author_username: author.map(Into::into) };
	let topic = match resolve_topic(app, embed_url, topic_id, &retrieve_opts).await? {
		TopicLookup::Found(topic) => topic,
		TopicLookup::Pending => {
			return Ok(CommentsOutcome { class_attr: allowed.class_attr, page: CommentsPage::Pending });
		}
	};

	let view_opts = TopicViewOptions {
		limit: MAX_EMBED_POSTS,
		exclude_first: true,
		exclude_deleted_users: true,
		exclude_hidden: true,
		author_username: author,
	};
	let view = app.meta_adapter.build_topic_view(topic.topic_id, &view_opts).await?;
	let topic_url = app.url(&format!("/t/{}/{}", view.topic.slug, view.topic.topic_id));

	Ok(CommentsOutcome {
		class_attr: allowed.class_attr,
		page: CommentsPage::Topic { view, topic_url: topic_url.into() },
	})
}

// Info //
//******//
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbedInfo {
	pub topic_id: TopicId,
	pub post_id: PostId,
	pub topic_slug: Box<str>,
}

/// Topic behind an indexed embed URL, for integrations holding an API key.
///
/// Bad credentials and unknown URLs are both `NotFound`, so the two cannot be
/// told apart from outside.
pub async fn info(
	app: &App,
	embed_url: Option<&str>,
	creds: &ApiCredentials,
) -> ClResult<EmbedInfo> {
	let meta = &app.meta_adapter;

	let (key, username) = creds.pair().ok_or(Error::NotFound)?;
	let Some(user) = meta.verify_api_key(key, username).await? else {
		info!(username, "Embed info: invalid API credentials");
		return Err(Error::NotFound);
	};

	let embed_url =
		embed_url.map(normalize_embed_url).filter(|url| !url.is_empty()).ok_or(Error::NotFound)?;
	let embed = meta.read_topic_embed(embed_url).await?.ok_or(Error::NotFound)?;
	let topic = meta.read_topic(embed.topic_id).await?.ok_or(Error::NotFound)?;
	debug!(user_id = %user.user_id, topic_id = %topic.topic_id, "Embed info");

	Ok(EmbedInfo { topic_id: topic.topic_id, post_id: embed.post_id, topic_slug: topic.slug })
}

// vim: ts=4
