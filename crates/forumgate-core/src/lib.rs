//! Core infrastructure for forumgate.
//!
//! Shared application state and the request plumbing (extractors and
//! middlewares) used by the feature crates and the server.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod extensions;
pub mod extract;
pub mod middleware;
pub mod prelude;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState};
pub use extensions::Extensions;
pub use extract::{ApiCredentials, Auth, OptionalAuth, OptionalRequestId, SessionCtx};

// vim: ts=4
