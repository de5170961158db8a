//! Unsubscribe HTTP handlers

use axum::{
	Form, Json,
	extract::{OriginalUri, Path, Query, State, rejection::FormRejection},
	http::{HeaderMap, header},
	response::Redirect,
};
use serde::Deserialize;

use forumgate_core::extract::{OptionalAuth, OptionalRequestId};
use forumgate_types::types::ApiResponse;

use crate::engine::{self, UnsubscribePreview, UnsubscribeToggles, UnsubscribedInfo};
use crate::prelude::*;

fn header_str(headers: &HeaderMap, name: impl header::AsHeaderName) -> Option<&str> {
	headers.get(name).and_then(|h| h.to_str().ok()).filter(|v| !v.is_empty())
}

/// Absolute URL of the request as the browser sent it, relative without a `Host`
fn request_url(headers: &HeaderMap, path: &str) -> String {
	let Some(host) = header_str(headers, header::HOST) else {
		return path.to_string();
	};
	let scheme = match header_str(headers, "x-forwarded-proto") {
		Some("https") => "https",
		_ => "http",
	};
	format!("{}://{}{}", scheme, host, path)
}

/// GET /email/unsubscribe/{key}
pub async fn get_unsubscribe(
	State(app): State<App>,
	Path(key): Path<String>,
	OptionalAuth(auth): OptionalAuth,
	OriginalUri(uri): OriginalUri,
	OptionalRequestId(req_id): OptionalRequestId,
	headers: HeaderMap,
) -> ClResult<Json<ApiResponse<UnsubscribePreview>>> {
	let request_url = request_url(&headers, &app.url(&uri.to_string()));
	let preview = engine::preview(&app, &key, auth.map(|a| a.user_id), &request_url).await?;

	Ok(Json(ApiResponse::new(preview).with_req_id(req_id.unwrap_or_default())))
}

/// POST /email/unsubscribe/{key}
pub async fn post_unsubscribe(
	State(app): State<App>,
	Path(key): Path<String>,
	headers: HeaderMap,
	form: Result<Form<UnsubscribeToggles>, FormRejection>,
) -> ClResult<Redirect> {
	// A bodyless POST asks for nothing and is sent back like an empty form
	let toggles = match form {
		Ok(Form(toggles)) => toggles,
		Err(FormRejection::InvalidFormContentType(_)) => UnsubscribeToggles::default(),
		Err(err) => return Err(Error::ValidationError(err.body_text())),
	};
	let result = engine::apply(&app, &key, &toggles).await?;

	let target = engine::redirect_target(
		&app.opts.base_path,
		&result,
		header_str(&headers, header::REFERER),
		header_str(&headers, header::HOST),
	);

	Ok(Redirect::to(&target))
}

#[derive(Debug, Deserialize)]
pub struct UnsubscribedQuery {
	topic_id: Option<String>,
	email: Option<String>,
}

/// GET /email/unsubscribed
pub async fn get_unsubscribed(
	State(app): State<App>,
	Query(query): Query<UnsubscribedQuery>,
	OptionalRequestId(req_id): OptionalRequestId,
) -> ClResult<Json<ApiResponse<UnsubscribedInfo>>> {
	let info =
		engine::unsubscribed(&app, query.topic_id.as_deref(), query.email.as_deref()).await?;

	Ok(Json(ApiResponse::new(info).with_req_id(req_id.unwrap_or_default())))
}

/// GET /email/preferences
pub async fn get_preferences(
	State(app): State<App>,
	OptionalAuth(auth): OptionalAuth,
) -> ClResult<Redirect> {
	let url = engine::preferences_url(&app, auth.map(|a| a.user_id)).await?;
	Ok(Redirect::to(&url))
}

// vim: ts=4
