//! Topic view, embed index, retrieval queue and credential tests

#![allow(clippy::expect_used, clippy::unwrap_used)]

use forumgate::meta_adapter::{
	CredentialStore, EmbeddableHostRegistry, ForumContentStore, TopicEmbedIndex, TopicViewOptions,
};
use forumgate::retriever::{RetrieveOptions, TopicRetriever};
use forumgate::types::{TopicId, UserId};
use forumgate::error::Error;
use forumgate_meta_adapter_sqlite::{CreatePost, CreateTopic, CreateUser, MetaAdapterSqlite};
use tempfile::TempDir;

async fn create_test_adapter() -> (MetaAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path()).await.expect("Failed to create adapter");

	(adapter, temp_dir)
}

async fn create_user(adapter: &MetaAdapterSqlite, username: &str) -> UserId {
	let email = format!("{username}@example.com");
	adapter
		.create_user(&CreateUser { username, email: &email, ..Default::default() })
		.await
		.expect("Failed to create user")
}

async fn post(
	adapter: &MetaAdapterSqlite,
	topic_id: TopicId,
	post_number: i32,
	user_id: Option<UserId>,
) -> CreatePost<'static> {
	let post = CreatePost {
		topic_id,
		post_number,
		user_id,
		cooked: "<p>hi</p>",
		hidden: false,
		deleted: false,
	};
	adapter.create_post(&post).await.expect("Failed to create post");
	post
}

#[tokio::test]
async fn test_topic_view_filters() {
	let (adapter, _temp) = create_test_adapter().await;
	let alice = create_user(&adapter, "alice").await;
	let bob = create_user(&adapter, "bob").await;
	let topic = adapter
		.create_topic(&CreateTopic { title: "Hello", slug: "hello", category_id: None })
		.await
		.unwrap();

	post(&adapter, topic, 1, Some(alice)).await;
	post(&adapter, topic, 2, Some(bob)).await;
	post(&adapter, topic, 3, None).await;
	let mut hidden = post(&adapter, topic, 4, Some(bob)).await;
	hidden.post_number = 5;
	hidden.hidden = true;
	adapter.create_post(&hidden).await.unwrap();
	let mut deleted = hidden.clone();
	deleted.post_number = 6;
	deleted.hidden = false;
	deleted.deleted = true;
	adapter.create_post(&deleted).await.unwrap();

	let opts = TopicViewOptions {
		limit: 100,
		exclude_first: true,
		exclude_deleted_users: true,
		exclude_hidden: true,
		author_username: None,
	};
	let view = adapter.build_topic_view(topic, &opts).await.unwrap();
	let numbers: Vec<i32> = view.posts.iter().map(|p| p.post_number).collect();
	assert_eq!(numbers, vec![2, 4]);
	assert_eq!(view.posts_count, 2);
	assert_eq!(&*view.topic.slug, "hello");

	let limited = TopicViewOptions { limit: 1, ..opts.clone() };
	let view = adapter.build_topic_view(topic, &limited).await.unwrap();
	assert_eq!(view.posts.len(), 1);
	assert_eq!(view.posts_count, 2);

	let by_alice = TopicViewOptions { exclude_first: false, author_username: Some("ALICE"), ..opts };
	let view = adapter.build_topic_view(topic, &by_alice).await.unwrap();
	assert_eq!(view.posts.len(), 1);
	assert_eq!(view.posts[0].username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_topic_view_missing_topic() {
	let (adapter, _temp) = create_test_adapter().await;
	let res = adapter.build_topic_view(TopicId(404), &TopicViewOptions::default()).await;
	assert!(matches!(res, Err(Error::NotFound)));
}

#[tokio::test]
async fn test_hosts_in_registration_order() {
	let (adapter, _temp) = create_test_adapter().await;
	adapter.create_embeddable_host("example.com/blog", Some("blog")).await.unwrap();
	adapter.create_embeddable_host("example.com", None).await.unwrap();

	let hosts = adapter.list_embeddable_hosts().await.unwrap();
	assert_eq!(hosts.len(), 2);
	assert_eq!(&*hosts[0].host, "example.com/blog");
	assert_eq!(hosts[0].class_name.as_deref(), Some("blog"));
	assert_eq!(hosts[1].class_name, None);
}

#[tokio::test]
async fn test_retrieval_queue_and_embed_index() {
	let (adapter, _temp) = create_test_adapter().await;
	let url = "https://example.com/blog/post-1";

	assert!(adapter.read_topic_embed(url).await.unwrap().is_none());

	let opts = RetrieveOptions { author_username: Some("alice".into()) };
	adapter.retrieve(url, &opts).await.unwrap();
	adapter.retrieve(url, &RetrieveOptions::default()).await.unwrap();

	let queue = adapter.list_retrieval_requests().await.unwrap();
	assert_eq!(queue.len(), 1);
	assert_eq!(queue[0].attempts, 2);
	assert_eq!(queue[0].author_username.as_deref(), Some("alice"));

	let topic = adapter
		.create_topic(&CreateTopic { title: "Post 1", slug: "post-1", category_id: None })
		.await
		.unwrap();
	let post_id = adapter
		.create_post(&CreatePost {
			topic_id: topic,
			post_number: 1,
			user_id: None,
			cooked: "",
			hidden: false,
			deleted: false,
		})
		.await
		.unwrap();
	adapter.create_topic_embed(url, topic, post_id).await.unwrap();

	// Lookup ignores case, the completed import clears the queue
	let embed = adapter
		.read_topic_embed("HTTPS://example.com/blog/post-1")
		.await
		.unwrap()
		.expect("embed exists");
	assert_eq!(embed.topic_id, topic);
	assert_eq!(embed.post_id, post_id);
	assert!(adapter.list_retrieval_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_api_keys() {
	let (adapter, _temp) = create_test_adapter().await;
	let alice = create_user(&adapter, "alice").await;
	create_user(&adapter, "bob").await;

	adapter.create_api_key("master-secret", None, Some("importer")).await.unwrap();
	adapter.create_api_key("alice-secret", Some(alice), None).await.unwrap();

	let user = adapter.verify_api_key("master-secret", "bob").await.unwrap();
	assert_eq!(user.map(|u| u.username), Some("bob".into()));

	let user = adapter.verify_api_key("alice-secret", "alice").await.unwrap();
	assert_eq!(user.map(|u| u.user_id), Some(alice));

	// User keys cannot act as somebody else
	assert!(adapter.verify_api_key("alice-secret", "bob").await.unwrap().is_none());
	assert!(adapter.verify_api_key("master-secret", "nobody").await.unwrap().is_none());
	assert!(adapter.verify_api_key("wrong", "alice").await.unwrap().is_none());
	assert!(adapter.verify_api_key("", "alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sessions() {
	let (adapter, _temp) = create_test_adapter().await;
	let alice = create_user(&adapter, "alice").await;
	adapter.create_session("tok", alice).await.unwrap();

	assert_eq!(adapter.read_session_user("tok").await.unwrap(), Some(alice));
	assert_eq!(adapter.read_session_user("other").await.unwrap(), None);
	assert!(adapter.read_user(alice).await.unwrap().is_some());
}

// vim: ts=4
