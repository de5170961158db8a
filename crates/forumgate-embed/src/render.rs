//! HTML rendering of embedded comments with Handlebars
//!
//! Three pages: the comment list, the self-refreshing "loading" page shown
//! while a topic is being retrieved, and the embed error page.

use handlebars::Handlebars;
use serde::Serialize;

use forumgate_types::meta_adapter::{PostView, TopicView};

use crate::prelude::*;

/// Seconds before the loading page asks again
pub const LOADING_REFRESH_SECS: u32 = 30;

const COMMENTS_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{title}}</title>
</head>
<body>
<div id="embedded-posts"{{{class_attr}}}>
{{#each posts}}
<article class="post" id="post-{{post_number}}">
<header class="author">{{display_name}}</header>
<div class="cooked">{{{cooked}}}</div>
</article>
{{/each}}
{{#if more}}
<a class="view-more" href="{{topic_url}}" target="_blank">View {{posts_count}} replies</a>
{{/if}}
<a class="button" href="{{topic_url}}" target="_blank">Continue discussion</a>
</div>
</body>
</html>
"#;

const LOADING_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{{refresh}}">
</head>
<body>
<div id="embedded-posts"{{{class_attr}}}>
<p class="loading">Loading discussion...</p>
</div>
</body>
</html>
"#;

const ERROR_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
</head>
<body>
<div class="embed-error">
<h3>{{message}}</h3>
</div>
</body>
</html>
"#;

#[derive(Serialize)]
struct PostContext<'a> {
	post_number: i32,
	display_name: &'a str,
	cooked: &'a str,
}

impl<'a> From<&'a PostView> for PostContext<'a> {
	fn from(post: &'a PostView) -> Self {
		let display_name = match (post.name.as_deref(), post.username.as_deref()) {
			(Some(name), _) if !name.trim().is_empty() => name,
			(_, Some(username)) => username,
			_ => "",
		};
		Self { post_number: post.post_number, display_name, cooked: &post.cooked }
	}
}

#[derive(Serialize)]
struct CommentsContext<'a> {
	title: &'a str,
	class_attr: &'a str,
	topic_url: &'a str,
	posts: Vec<PostContext<'a>>,
	posts_count: u64,
	more: bool,
}

pub struct EmbedRenderer {
	handlebars: Handlebars<'static>,
}

impl EmbedRenderer {
	pub fn new() -> ClResult<Self> {
		let mut handlebars = Handlebars::new();
		for (name, template) in
			[("comments", COMMENTS_TEMPLATE), ("loading", LOADING_TEMPLATE), ("error", ERROR_TEMPLATE)]
		{
			handlebars.register_template_string(name, template).map_err(|err| {
				Error::Internal(format!("embed template {} does not compile: {}", name, err))
			})?;
		}

		Ok(Self { handlebars })
	}

	fn render<T: Serialize>(&self, name: &str, data: &T) -> ClResult<String> {
		self.handlebars.render(name, data).map_err(|err| {
			warn!("Failed to render embed template {}: {}", name, err);
			Error::Internal(format!("render {}", name))
		})
	}

	pub fn comments(
		&self,
		view: &TopicView,
		class_attr: Option<&str>,
		topic_url: &str,
	) -> ClResult<String> {
		let posts: Vec<PostContext<'_>> = view.posts.iter().map(PostContext::from).collect();
		let ctx = CommentsContext {
			title: &view.topic.title,
			class_attr: class_attr.unwrap_or_default(),
			topic_url,
			more: view.posts_count > posts.len() as u64,
			posts,
			posts_count: view.posts_count,
		};
		self.render("comments", &ctx)
	}

	pub fn loading(&self, class_attr: Option<&str>) -> ClResult<String> {
		let ctx = serde_json::json!({
			"refresh": LOADING_REFRESH_SECS,
			"class_attr": class_attr.unwrap_or_default(),
		});
		self.render("loading", &ctx)
	}

	pub fn error(&self, message: &str) -> ClResult<String> {
		self.render("error", &serde_json::json!({ "message": message }))
	}
}

impl std::fmt::Debug for EmbedRenderer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EmbedRenderer").finish_non_exhaustive()
	}
}


// vim: ts=4
