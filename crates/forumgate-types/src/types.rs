//! Common types used throughout forumgate.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::time::SystemTime;

// Ids //
//*****//
macro_rules! define_id {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(pub i64);

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}
	};
}

define_id!(
	/// Forum account id
	UserId
);
define_id!(TopicId);
define_id!(PostId);
define_id!(CategoryId);

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// NotificationLevel //
//*******************//
/// Per-topic and per-category notification level.
///
/// The numeric values are the stored representation and define the ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
	Muted,
	Regular,
	Tracking,
	Watching,
	/// Only meaningful for category preferences
	WatchingFirstPost,
}

/// Category levels that count as "watching the category"
pub const CATEGORY_WATCHING_LEVELS: &[NotificationLevel] =
	&[NotificationLevel::Watching, NotificationLevel::WatchingFirstPost];

impl NotificationLevel {
	pub const fn as_i64(self) -> i64 {
		match self {
			Self::Muted => 0,
			Self::Regular => 1,
			Self::Tracking => 2,
			Self::Watching => 3,
			Self::WatchingFirstPost => 4,
		}
	}

	pub const fn from_i64(value: i64) -> Option<Self> {
		match value {
			0 => Some(Self::Muted),
			1 => Some(Self::Regular),
			2 => Some(Self::Tracking),
			3 => Some(Self::Watching),
			4 => Some(Self::WatchingFirstPost),
			_ => None,
		}
	}
}

// Embed URLs //
//************//
/// Canonical form of an embed URL used as index and queue key.
///
/// Surrounding whitespace and a single trailing slash are dropped; the
/// stores compare case-insensitively.
pub fn normalize_embed_url(url: &str) -> &str {
	let url = url.trim();
	url.strip_suffix('/').unwrap_or(url)
}

// API responses //
//***************//
/// Envelope for JSON API responses
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
	pub data: T,
	pub req_id: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, req_id: None }
	}

	pub fn with_req_id(mut self, req_id: String) -> Self {
		if !req_id.is_empty() {
			self.req_id = Some(req_id);
		}
		self
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
	pub code: String,
	pub message: String,
}

/// Error payload for the JSON API surface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: ErrorDetails,
}

impl ErrorResponse {
	pub fn new(code: String, message: String) -> Self {
		Self { error: ErrorDetails { code, message } }
	}
}


// vim: ts=4
