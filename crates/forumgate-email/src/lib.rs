//! Token-gated email unsubscribe for forumgate.
//!
//! [`engine`] resolves unsubscribe keys and applies the requested
//! notification changes, [`handler`] exposes it over HTTP.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod handler;
mod prelude;

pub use engine::{ApplyResult, UnsubscribePreview, UnsubscribeTarget, UnsubscribeToggles};

// vim: ts=4
