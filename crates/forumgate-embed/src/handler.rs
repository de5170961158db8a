//! Embed HTTP handlers

use axum::{
	Json,
	extract::{Query, State},
	http::{HeaderMap, StatusCode, header},
	response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use forumgate_core::extract::ApiCredentials;

use crate::gateway::{self, CommentsPage, EmbedRequest};
use crate::prelude::*;
use crate::render::EmbedRenderer;

#[derive(Debug, Default, Deserialize)]
pub struct CommentsQuery {
	embed_url: Option<String>,
	topic_id: Option<String>,
	/// Author to attribute imported topics to, and to filter posts by
	discourse_username: Option<String>,
}

fn error_page(err: &Error) -> (StatusCode, &'static str) {
	match err {
		Error::MissingParameter(_) => {
			(StatusCode::BAD_REQUEST, "An embed_url or topic_id is required.")
		}
		Error::PermissionDenied => {
			(StatusCode::FORBIDDEN, "This site is not allowed to embed comments.")
		}
		Error::NotFound => (StatusCode::NOT_FOUND, "The discussion could not be found."),
		_ => (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong loading the discussion."),
	}
}

fn render_page(
	renderer: &EmbedRenderer,
	outcome: ClResult<gateway::CommentsOutcome>,
) -> (StatusCode, String) {
	let rendered = outcome.and_then(|outcome| match &outcome.page {
		CommentsPage::Topic { view, topic_url } => {
			renderer.comments(view, outcome.class_attr.as_deref(), topic_url)
		}
		CommentsPage::Pending => renderer.loading(outcome.class_attr.as_deref()),
	});

	match rendered {
		Ok(html) => (StatusCode::OK, html),
		Err(err) => {
			let (status, message) = error_page(&err);
			if status.is_server_error() {
				warn!("Embed failed: {}", err);
			} else {
				debug!("Embed rejected: {}", err);
			}
			(status, renderer.error(message).unwrap_or_else(|_| message.to_string()))
		}
	}
}

/// GET /embed/comments
pub async fn get_comments(
	State(app): State<App>,
	Query(query): Query<CommentsQuery>,
	headers: HeaderMap,
) -> Response {
	let req = EmbedRequest {
		embed_url: query.embed_url.as_deref(),
		topic_id: query.topic_id.as_deref(),
		referrer: headers.get(header::REFERER).and_then(|h| h.to_str().ok()),
		author_username: query.discourse_username.as_deref(),
	};

	let (status, body) = match app.ext::<EmbedRenderer>() {
		Ok(renderer) => render_page(renderer, gateway::render_comments(&app, &req).await),
		Err(err) => {
			warn!("Embed renderer unavailable: {}", err);
			(StatusCode::INTERNAL_SERVER_ERROR, String::new())
		}
	};

	(status, [(header::X_FRAME_OPTIONS, "ALLOWALL")], Html(body)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct InfoQuery {
	embed_url: Option<String>,
}

/// GET /embed/info
pub async fn get_info(
	State(app): State<App>,
	Query(query): Query<InfoQuery>,
	creds: ApiCredentials,
) -> Response {
	match gateway::info(&app, query.embed_url.as_deref(), &creds).await {
		Ok(info) => Json(info).into_response(),
		Err(Error::NotFound) => {
			let payload = serde_json::json!({
				"error_type": "not_found",
				"errors": ["The requested URL or resource could not be found."],
			});
			(StatusCode::NOT_FOUND, Json(payload)).into_response()
		}
		Err(err) => err.into_response(),
	}
}

// vim: ts=4
