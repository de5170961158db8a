//! Topic retriever collaborator.
//!
//! A retriever turns a remote page into a forum topic and records it in the
//! topic embed index. Retrieval is slow (network fetch), so callers only ask
//! for it to happen and never wait for the result.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::prelude::*;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveOptions {
	/// Forum user the imported topic should be attributed to
	pub author_username: Option<Box<str>>,
}

#[async_trait]
pub trait TopicRetriever: Debug + Send + Sync {
	/// Request retrieval of `embed_url`. Must return without waiting for the
	/// fetch and must be safe to call repeatedly for the same URL.
	async fn retrieve(&self, embed_url: &str, opts: &RetrieveOptions) -> ClResult<()>;
}

// vim: ts=4
