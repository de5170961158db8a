//! Referrer-gated topic embedding for forumgate.
//!
//! External sites show a forum topic's replies as "comments" below their own
//! pages. [`gateway`] checks the embedding site and finds the topic,
//! [`render`] produces the HTML and [`handler`] wires both into axum.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod gateway;
pub mod handler;
pub mod host;
mod prelude;
pub mod render;
pub mod retriever;

use forumgate_core::Extensions;

use crate::prelude::*;

pub use gateway::{AllowedHost, EmbedInfo, EmbedRequest, TopicLookup, TopicRef};
pub use render::EmbedRenderer;
pub use retriever::ThrottledRetriever;

/// Register the embed state in the app's extension map
pub fn init(extensions: &mut Extensions) -> ClResult<()> {
	extensions.insert(EmbedRenderer::new()?);
	Ok(())
}

// vim: ts=4
