//! Shared types, adapter traits, and core utilities for forumgate.
//!
//! This crate holds everything the feature crates and the store adapters have
//! to agree on: identifiers, the error type, and the collaborator traits the
//! unsubscribe engine and the embed gateway are written against.

pub mod error;
pub mod meta_adapter;
pub mod prelude;
pub mod retriever;
pub mod types;

// vim: ts=4
