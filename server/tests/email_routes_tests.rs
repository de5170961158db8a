//! Unsubscribe routes driven through the full router

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum::{
	body::Body,
	http::{Request, StatusCode, header},
};

use common::{body_json, create_fixture, send, setup_test_logging};
use forumgate_types::meta_adapter::NotificationStateStore;
use forumgate_types::types::{CategoryId, NotificationLevel};

fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
	Request::post(uri)
		.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(header::HOST, "forum.example.com")
		.body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
		.unwrap()
}

fn location(res: &axum::http::Response<Body>) -> &str {
	res.headers().get(header::LOCATION).and_then(|h| h.to_str().ok()).unwrap_or_default()
}

#[tokio::test]
async fn test_preview() {
	setup_test_logging();
	let fx = create_fixture().await;

	let req = Request::get("/email/unsubscribe/abc123")
		.header("x-request-id", "test-req-1")
		.body(Body::empty())
		.unwrap();
	let res = send(&fx.router, req).await;
	assert_eq!(res.status(), StatusCode::OK);
	assert_eq!(res.headers().get("x-request-id").unwrap(), "test-req-1");

	let json = body_json(res).await;
	assert_eq!(json["reqId"], "test-req-1");
	let data = &json["data"];
	assert_eq!(data["username"], "alice");
	assert_eq!(data["key_type"], "topic");
	assert_eq!(data["topic"]["id"], fx.topic.0);
	assert_eq!(data["watching_topic"], true);
	assert_eq!(data["watched_count"], 1);
	assert!(data.get("not_found").is_none());
	assert!(data.get("different_user").is_none());
}

#[tokio::test]
async fn test_preview_unknown_key() {
	let fx = create_fixture().await;

	let res = send(&fx.router, Request::get("/email/unsubscribe/nope").body(Body::empty()).unwrap()).await;
	assert_eq!(res.status(), StatusCode::OK);
	let json = body_json(res).await;
	assert_eq!(json["data"], serde_json::json!({ "not_found": true }));
}

#[tokio::test]
async fn test_preview_warns_other_session() {
	let fx = create_fixture().await;
	fx.adapter.create_session("bob-session", fx.bob).await.unwrap();

	let req = Request::get("/email/unsubscribe/abc123")
		.header(header::AUTHORIZATION, "Bearer bob-session")
		.body(Body::empty())
		.unwrap();
	let json = body_json(send(&fx.router, req).await).await;
	assert_eq!(json["data"]["different_user"]["name"], "Alice");
	assert_eq!(json["data"]["different_user"]["return_url"], "/email/unsubscribe/abc123");

	// An unknown token is not an error, just no session
	let req = Request::get("/email/unsubscribe/abc123")
		.header(header::AUTHORIZATION, "Bearer stale")
		.body(Body::empty())
		.unwrap();
	let res = send(&fx.router, req).await;
	assert_eq!(res.status(), StatusCode::OK);
	assert!(body_json(res).await["data"].get("different_user").is_none());
}

#[tokio::test]
async fn test_return_url_is_absolute_behind_host() {
	let fx = create_fixture().await;
	fx.adapter.create_session("bob-session", fx.bob).await.unwrap();

	let req = Request::get("/email/unsubscribe/abc123?from=digest")
		.header(header::AUTHORIZATION, "Bearer bob-session")
		.header(header::HOST, "forum.example.com")
		.header("x-forwarded-proto", "https")
		.body(Body::empty())
		.unwrap();
	let json = body_json(send(&fx.router, req).await).await;
	assert_eq!(
		json["data"]["different_user"]["return_url"],
		"https://forum.example.com/email/unsubscribe/abc123?from=digest"
	);
}

#[tokio::test]
async fn test_unwatch_category_redirects_to_confirmation() {
	let fx = create_fixture().await;

	let res = send(&fx.router, post_form("/email/unsubscribe/abc123", &[("unwatch_category", "1")])).await;
	assert_eq!(res.status(), StatusCode::SEE_OTHER);
	assert_eq!(
		location(&res),
		format!("/email/unsubscribed?topic_id={}&email=alice%40example.com", fx.topic)
	);

	assert_eq!(
		fx.adapter.read_topic_level(fx.alice, fx.topic).await.unwrap(),
		Some(NotificationLevel::Tracking)
	);
	assert_eq!(fx.adapter.read_category_level(fx.alice, CategoryId(7)).await.unwrap(), None);
}

#[tokio::test]
async fn test_no_toggles_goes_back() {
	let fx = create_fixture().await;

	let mut req = post_form("/email/unsubscribe/abc123", &[("unwatch_topic", "false")]);
	req.headers_mut()
		.insert(header::REFERER, "http://forum.example.com/t/hello/1".parse().unwrap());
	let res = send(&fx.router, req).await;
	assert_eq!(res.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&res), "http://forum.example.com/t/hello/1");

	let mut req = post_form("/email/unsubscribe/abc123", &[]);
	req.headers_mut().insert(header::REFERER, "https://evil.example.net/".parse().unwrap());
	let res = send(&fx.router, req).await;
	assert_eq!(location(&res), "/email/unsubscribe/abc123");

	assert_eq!(
		fx.adapter.read_topic_level(fx.alice, fx.topic).await.unwrap(),
		Some(NotificationLevel::Watching)
	);
}

#[tokio::test]
async fn test_bodyless_post_goes_back() {
	let fx = create_fixture().await;

	let req = Request::post("/email/unsubscribe/abc123").body(Body::empty()).unwrap();
	let res = send(&fx.router, req).await;
	assert_eq!(res.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&res), "/email/unsubscribe/abc123");
	assert_eq!(
		fx.adapter.read_topic_level(fx.alice, fx.topic).await.unwrap(),
		Some(NotificationLevel::Watching)
	);
}

#[tokio::test]
async fn test_apply_unknown_key() {
	let fx = create_fixture().await;

	let res = send(&fx.router, post_form("/email/unsubscribe/nope", &[("mute_topic", "1")])).await;
	assert_eq!(res.status(), StatusCode::NOT_FOUND);
	assert_eq!(body_json(res).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn test_unsubscribed_page() {
	let fx = create_fixture().await;

	let uri = format!("/email/unsubscribed?topic_id={}&email=alice%40example.com", fx.topic);
	let res = send(&fx.router, Request::get(uri).body(Body::empty()).unwrap()).await;
	assert_eq!(res.status(), StatusCode::OK);
	let json = body_json(res).await;
	assert_eq!(json["data"]["email"], "alice@example.com");
	assert_eq!(json["data"]["topic"]["slug"], "hello");
}

#[tokio::test]
async fn test_preferences_redirect() {
	let fx = create_fixture().await;
	fx.adapter.create_session("alice-session", fx.alice).await.unwrap();

	let req = Request::get("/email/preferences")
		.header(header::AUTHORIZATION, "Bearer alice-session")
		.body(Body::empty())
		.unwrap();
	let res = send(&fx.router, req).await;
	assert_eq!(res.status(), StatusCode::SEE_OTHER);
	assert_eq!(location(&res), "/u/alice/preferences/emails");

	let res = send(&fx.router, Request::get("/email/preferences").body(Body::empty()).unwrap()).await;
	assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

// vim: ts=4
