//! Custom middlewares

use axum::{
	body::Body,
	extract::State,
	http::{HeaderValue, Request, header, response::Response},
	middleware::Next,
};
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use forumgate_types::meta_adapter::CredentialStore;

use crate::extract::{Auth, RequestId, SessionCtx};
use crate::prelude::*;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assign a request id and log every request with its outcome
pub async fn request_log(mut req: Request<Body>, next: Next) -> Response<Body> {
	let req_id = req
		.headers()
		.get(REQUEST_ID_HEADER)
		.and_then(|h| h.to_str().ok())
		.filter(|id| !id.is_empty() && id.len() <= 64)
		.map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
	req.extensions_mut().insert(RequestId(req_id.clone()));

	let start = Instant::now();
	let span = info_span!("REQ", req_id = %req_id);

	async move {
		info!("REQ {} {}", req.method(), req.uri().path());
		let mut res = next.run(req).await;

		let status = res.status();
		if status.is_client_error() || status.is_server_error() {
			warn!("RES: {} tm:{:?}", status, start.elapsed().as_millis());
		} else {
			info!("RES: {} tm:{:?}", status, start.elapsed().as_millis());
		}

		if let Ok(value) = HeaderValue::from_str(&req_id) {
			res.headers_mut().insert(REQUEST_ID_HEADER, value);
		}
		res
	}
	.instrument(span)
	.await
}

/// Attach the session user when a valid bearer token is presented.
///
/// Unknown tokens are ignored: the routes using this only treat the session
/// as a hint, never as an authorization gate.
pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> Response<Body> {
	let token = req
		.headers()
		.get(header::AUTHORIZATION)
		.and_then(|h| h.to_str().ok())
		.and_then(|h| h.strip_prefix("Bearer "))
		.map(str::trim)
		.filter(|t| !t.is_empty());

	if let Some(token) = token {
		match app.meta_adapter.read_session_user(token).await {
			Ok(Some(user_id)) => {
				req.extensions_mut().insert(Auth(SessionCtx { user_id }));
			}
			Ok(None) => debug!("Unknown session token"),
			Err(err) => warn!("Session lookup failed: {}", err),
		}
	}

	next.run(req).await
}

// vim: ts=4
