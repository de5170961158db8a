//! Shared setup for the HTTP tests
//!
//! The fixture is the scenario every test starts from: alice holds
//! unsubscribe key `abc123` for topic "hello" in category 7, and the topic is
//! indexed as the blog post `https://blog.example.com/hello`.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use axum::{
	Router,
	body::Body,
	http::{Request, Response},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use forumgate_core::App;
use forumgate_meta_adapter_sqlite::{
	CreatePost, CreateTopic, CreateUnsubscribeKey, CreateUser, MetaAdapterSqlite,
};
use forumgate_server::{AppBuilder, routes};
use forumgate_types::meta_adapter::UnsubscribeKeyType;
use forumgate_types::types::{CategoryId, NotificationLevel, TopicId, UserId};

pub struct Fixture {
	pub app: App,
	pub router: Router,
	pub adapter: MetaAdapterSqlite,
	pub alice: UserId,
	pub bob: UserId,
	pub topic: TopicId,
	_temp: TempDir,
}

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

pub async fn create_fixture() -> Fixture {
	let temp = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp.path()).await.expect("Failed to create adapter");

	let alice = adapter
		.create_user(&CreateUser {
			username: "alice",
			name: Some("Alice"),
			email: "alice@example.com",
			admin: false,
		})
		.await
		.unwrap();
	let bob = adapter
		.create_user(&CreateUser { username: "bob", email: "bob@example.com", ..Default::default() })
		.await
		.unwrap();
	let topic = adapter
		.create_topic(&CreateTopic { title: "Hello", slug: "hello", category_id: Some(CategoryId(7)) })
		.await
		.unwrap();

	let mut first_post = None;
	for (post_number, user_id) in [(1, alice), (2, bob)] {
		let post_id = adapter
			.create_post(&CreatePost {
				topic_id: topic,
				post_number,
				user_id: Some(user_id),
				cooked: "<p>Great post!</p>",
				hidden: false,
				deleted: false,
			})
			.await
			.unwrap();
		first_post.get_or_insert(post_id);
	}
	adapter
		.create_topic_embed("https://blog.example.com/hello", topic, first_post.unwrap())
		.await
		.unwrap();

	adapter
		.create_unsubscribe_key(&CreateUnsubscribeKey {
			key: "abc123",
			user_id: Some(alice),
			post_id: None,
			topic_id: Some(topic),
			key_type: UnsubscribeKeyType::Topic,
		})
		.await
		.unwrap();
	adapter.set_topic_level(alice, topic, NotificationLevel::Watching).await.unwrap();
	adapter.set_category_level(alice, CategoryId(7), NotificationLevel::Watching).await.unwrap();

	let mut builder = AppBuilder::new();
	builder
		.db_dir(temp.path())
		.meta_adapter(Arc::new(adapter.clone()))
		.retriever(Arc::new(adapter.clone()));
	let app = builder.build().await.expect("Failed to build app");
	let router = routes::init(app.clone());

	Fixture { app, router, adapter, alice, bob, topic, _temp: temp }
}

pub async fn send(router: &Router, req: Request<Body>) -> Response<Body> {
	router.clone().oneshot(req).await.expect("Request failed")
}

pub async fn body_string(res: Response<Body>) -> String {
	let bytes = res.into_body().collect().await.expect("Failed to read body").to_bytes();
	String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_json(res: Response<Body>) -> serde_json::Value {
	serde_json::from_str(&body_string(res).await).expect("Body is not JSON")
}

// vim: ts=4
