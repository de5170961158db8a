//! forumgate is the anonymous-access gateway of a forum.
//!
//! # Features
//!
//! - Email unsubscribe
//!		- one-click links carrying an unsubscribe key, no login needed
//!		- topic, category and mailing preference toggles
//! - Comment embedding
//!		- forum replies shown below blog posts on registered sites
//!		- unknown blog posts are queued for import

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
mod prelude;
pub mod routes;

pub use crate::app::AppBuilder;

// vim: ts=4
