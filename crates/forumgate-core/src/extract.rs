//! Custom extractors for forumgate-specific request data

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::prelude::*;

// Auth //
//******//
/// Logged-in forum session, set by the `optional_auth` middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCtx {
	pub user_id: UserId,
}

#[derive(Debug, Clone)]
pub struct Auth(pub SessionCtx);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		if let Some(auth) = parts.extensions.get::<Auth>().cloned() {
			Ok(auth)
		} else {
			Err(Error::PermissionDenied)
		}
	}
}

// OptionalAuth //
//***************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<SessionCtx>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}

// ApiCredentials //
//****************//
/// Elevated integration credentials: an API key plus the username to act as.
///
/// Headers take precedence over the `api_key` / `api_username` query
/// parameters. Never rejects; missing parts are `None`.
#[derive(Debug, Clone, Default)]
pub struct ApiCredentials {
	pub key: Option<Box<str>>,
	pub username: Option<Box<str>>,
}

#[derive(Deserialize, Default)]
struct CredentialQuery {
	api_key: Option<String>,
	api_username: Option<String>,
}

impl ApiCredentials {
	/// Both parts, if present and non-empty
	pub fn pair(&self) -> Option<(&str, &str)> {
		match (self.key.as_deref(), self.username.as_deref()) {
			(Some(key), Some(username)) if !key.is_empty() && !username.is_empty() => {
				Some((key, username))
			}
			_ => None,
		}
	}
}

impl<S> FromRequestParts<S> for ApiCredentials
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let header = |name: &str| {
			parts.headers.get(name).and_then(|h| h.to_str().ok()).map(|s| Box::from(s.trim()))
		};
		let query = Query::<CredentialQuery>::try_from_uri(&parts.uri)
			.map(|q| q.0)
			.unwrap_or_default();

		Ok(ApiCredentials {
			key: header("api-key").or_else(|| query.api_key.map(Into::into)),
			username: header("api-username").or_else(|| query.api_username.map(Into::into)),
		})
	}
}

// RequestId //
//***********//
/// Request ID for tracing and debugging
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Optional Request ID extractor - always succeeds, returns None if not available
#[derive(Clone, Debug)]
pub struct OptionalRequestId(pub Option<String>);

impl<S> FromRequestParts<S> for OptionalRequestId
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let req_id = parts.extensions.get::<RequestId>().map(|r| r.0.clone());
		Ok(OptionalRequestId(req_id))
	}
}


// vim: ts=4
