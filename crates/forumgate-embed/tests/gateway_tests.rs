//! Embed gateway tests against the SQLite adapter

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use forumgate_core::{ApiCredentials, App, AppBuilderOpts, AppState, Extensions};
use forumgate_embed::gateway::{self, CommentsPage, EmbedRequest, TopicLookup, TopicRef};
use forumgate_meta_adapter_sqlite::{CreatePost, CreateTopic, CreateUser, MetaAdapterSqlite};
use forumgate_types::error::{ClResult, Error};
use forumgate_types::retriever::{RetrieveOptions, TopicRetriever};
use forumgate_types::types::{PostId, TopicId, UserId};
use tempfile::TempDir;

#[derive(Debug, Default)]
struct RecordingRetriever {
	calls: Mutex<Vec<(String, RetrieveOptions)>>,
}

#[async_trait]
impl TopicRetriever for RecordingRetriever {
	async fn retrieve(&self, embed_url: &str, opts: &RetrieveOptions) -> ClResult<()> {
		self.calls.lock().push((embed_url.to_string(), opts.clone()));
		Ok(())
	}
}

struct Fixture {
	app: App,
	adapter: MetaAdapterSqlite,
	retriever: Arc<RecordingRetriever>,
	alice: UserId,
	topic: TopicId,
	first_post: PostId,
	_temp: TempDir,
}

/// Topic "hello" with replies by alice and bob, indexed as the blog post
/// `https://blog.example.com/hello`
async fn create_fixture() -> Fixture {
	let temp = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp.path()).await.expect("Failed to create adapter");

	let alice = adapter
		.create_user(&CreateUser { username: "alice", email: "alice@example.com", ..Default::default() })
		.await
		.unwrap();
	let bob = adapter
		.create_user(&CreateUser { username: "bob", email: "bob@example.com", ..Default::default() })
		.await
		.unwrap();
	let topic = adapter
		.create_topic(&CreateTopic { title: "Hello", slug: "hello", category_id: None })
		.await
		.unwrap();

	let mut first_post = None;
	for (post_number, user_id) in [(1, alice), (2, bob), (3, alice)] {
		let post_id = adapter
			.create_post(&CreatePost {
				topic_id: topic,
				post_number,
				user_id: Some(user_id),
				cooked: "<p>comment</p>",
				hidden: false,
				deleted: false,
			})
			.await
			.unwrap();
		first_post.get_or_insert(post_id);
	}
	let first_post = first_post.unwrap();
	adapter.create_topic_embed("https://blog.example.com/hello", topic, first_post).await.unwrap();

	let retriever = Arc::new(RecordingRetriever::default());
	let mut extensions = Extensions::new();
	forumgate_embed::init(&mut extensions).unwrap();
	let app: App = Arc::new(AppState {
		opts: AppBuilderOpts::default(),
		meta_adapter: Arc::new(adapter.clone()),
		retriever: retriever.clone(),
		extensions,
	});

	Fixture { app, adapter, retriever, alice, topic, first_post, _temp: temp }
}

fn request<'a>(embed_url: &'a str, referrer: Option<&'a str>) -> EmbedRequest<'a> {
	EmbedRequest { embed_url: Some(embed_url), referrer, ..Default::default() }
}

#[tokio::test]
async fn test_empty_registry_is_open() {
	let fx = create_fixture().await;

	let outcome =
		gateway::render_comments(&fx.app, &request("https://blog.example.com/hello", None)).await.unwrap();
	assert!(outcome.class_attr.is_none());
	let CommentsPage::Topic { view, topic_url } = outcome.page else {
		panic!("expected topic page");
	};
	assert_eq!(view.topic.topic_id, fx.topic);
	assert_eq!(&*topic_url, format!("/t/hello/{}", fx.topic));
	// The topic body itself is not a comment
	assert_eq!(view.posts.iter().map(|p| p.post_number).collect::<Vec<_>>(), vec![2, 3]);

	// authorize itself still denies without registered hosts
	let res = gateway::authorize(&fx.app, Some("https://blog.example.com/hello")).await;
	assert!(matches!(res, Err(Error::PermissionDenied)));
}

#[tokio::test]
async fn test_registered_hosts_gate_referrer() {
	let fx = create_fixture().await;
	fx.adapter.create_embeddable_host("https://blog.example.com/hello", Some("blog")).await.unwrap();

	let url = "https://blog.example.com/hello";
	let outcome = gateway::render_comments(&fx.app, &request(url, Some("https://BLOG.example.com/hello/"))).await.unwrap();
	assert_eq!(outcome.class_attr.as_deref(), Some(" class=\"blog\""));

	for referrer in [None, Some("https://other.com/hello"), Some("https://blog.example.com/other")] {
		let res = gateway::render_comments(&fx.app, &request(url, referrer)).await;
		assert!(matches!(res, Err(Error::PermissionDenied)), "referrer {referrer:?}");
	}
	assert!(fx.retriever.calls.lock().is_empty());
}

#[tokio::test]
async fn test_missing_parameters() {
	let fx = create_fixture().await;
	let res = gateway::render_comments(&fx.app, &EmbedRequest::default()).await;
	assert!(matches!(res, Err(Error::MissingParameter(_))));

	let res = gateway::resolve_topic(&fx.app, None, None, &RetrieveOptions::default()).await;
	assert!(matches!(res, Err(Error::MissingParameter(_))));
}

#[tokio::test]
async fn test_indexed_url_skips_retriever() {
	let fx = create_fixture().await;

	let lookup = gateway::resolve_topic(
		&fx.app,
		Some("https://blog.example.com/hello/"),
		None,
		&RetrieveOptions::default(),
	)
	.await
	.unwrap();
	assert_eq!(lookup, TopicLookup::Found(TopicRef { topic_id: fx.topic, post_id: Some(fx.first_post) }));
	assert!(fx.retriever.calls.lock().is_empty());
}

#[tokio::test]
async fn test_unindexed_url_retrieves_once() {
	let fx = create_fixture().await;

	let req = EmbedRequest {
		embed_url: Some("https://blog.example.com/new-post"),
		author_username: Some("alice"),
		..Default::default()
	};
	let outcome = gateway::render_comments(&fx.app, &req).await.unwrap();
	assert!(matches!(outcome.page, CommentsPage::Pending));

	let calls = fx.retriever.calls.lock();
	assert_eq!(calls.len(), 1);
	assert_eq!(calls[0].0, "https://blog.example.com/new-post");
	assert_eq!(calls[0].1.author_username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_author_filters_indexed_topic() {
	let fx = create_fixture().await;

	let req = EmbedRequest {
		embed_url: Some("https://blog.example.com/hello"),
		author_username: Some("alice"),
		..Default::default()
	};
	let outcome = gateway::render_comments(&fx.app, &req).await.unwrap();
	let CommentsPage::Topic { view, .. } = outcome.page else {
		panic!("expected topic page");
	};
	assert_eq!(view.posts.len(), 1);
	assert_eq!(view.posts[0].username.as_deref(), Some("alice"));
	assert!(fx.retriever.calls.lock().is_empty());
}

#[tokio::test]
async fn test_topic_id_lookup() {
	let fx = create_fixture().await;
	let opts = RetrieveOptions::default();

	let topic_id = fx.topic.to_string();
	let lookup = gateway::resolve_topic(&fx.app, None, Some(&topic_id), &opts).await.unwrap();
	assert_eq!(lookup, TopicLookup::Found(TopicRef { topic_id: fx.topic, post_id: None }));

	for bad in ["999999", "abc"] {
		let res = gateway::resolve_topic(&fx.app, None, Some(bad), &opts).await;
		assert!(matches!(res, Err(Error::NotFound)), "topic_id {bad}");
	}
}

#[tokio::test]
async fn test_info_requires_credentials() {
	let fx = create_fixture().await;
	fx.adapter.create_api_key("master-key", None, Some("integration")).await.unwrap();
	fx.adapter.create_api_key("alice-key", Some(fx.alice), None).await.unwrap();
	let url = Some("https://blog.example.com/hello");

	let creds = |key: &str, username: &str| ApiCredentials {
		key: Some(key.into()),
		username: Some(username.into()),
	};

	let info = gateway::info(&fx.app, url, &creds("master-key", "bob")).await.unwrap();
	assert_eq!(info.topic_id, fx.topic);
	assert_eq!(info.post_id, fx.first_post);
	assert_eq!(&*info.topic_slug, "hello");

	assert!(gateway::info(&fx.app, url, &creds("alice-key", "alice")).await.is_ok());

	// Every failure looks the same
	for (creds, url) in [
		(creds("alice-key", "bob"), url),
		(creds("wrong", "alice"), url),
		(ApiCredentials::default(), url),
		(creds("master-key", "alice"), Some("https://blog.example.com/unknown")),
		(creds("master-key", "alice"), None),
	] {
		let res = gateway::info(&fx.app, url, &creds).await;
		assert!(matches!(res, Err(Error::NotFound)));
	}
}

// vim: ts=4
