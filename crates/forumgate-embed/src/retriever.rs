//! Per-URL retrieval throttle
//!
//! Browsers keep polling an embed while its topic is being imported, and each
//! poll misses the index. The throttle forwards at most one retrieval per
//! embed URL per window to the wrapped retriever and drops the rest.

use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::{
	num::NonZeroUsize,
	sync::Arc,
	time::{Duration, Instant},
};

use forumgate_types::retriever::{RetrieveOptions, TopicRetriever};

use crate::prelude::*;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(4096) {
	Some(n) => n,
	None => NonZeroUsize::MIN,
};

pub struct ThrottledRetriever {
	inner: Arc<dyn TopicRetriever>,
	window: Duration,
	recent: Mutex<LruCache<Box<str>, Instant>>,
}

impl ThrottledRetriever {
	pub fn new(inner: Arc<dyn TopicRetriever>, window: Duration) -> Self {
		Self::with_capacity(inner, window, DEFAULT_CAPACITY)
	}

	pub fn with_capacity(
		inner: Arc<dyn TopicRetriever>,
		window: Duration,
		capacity: NonZeroUsize,
	) -> Self {
		Self { inner, window, recent: Mutex::new(LruCache::new(capacity)) }
	}

	/// Record an attempt, false if the URL was already tried within the window
	fn admit(&self, key: &str) -> bool {
		let now = Instant::now();
		let mut recent = self.recent.lock();

		if let Some(last) = recent.get(key)
			&& now.duration_since(*last) < self.window
		{
			return false;
		}
		recent.put(key.into(), now);
		true
	}

	/// Forget a failed attempt so the next miss retries
	fn release(&self, key: &str) {
		self.recent.lock().pop(key);
	}
}

impl std::fmt::Debug for ThrottledRetriever {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ThrottledRetriever")
			.field("inner", &self.inner)
			.field("window", &self.window)
			.finish_non_exhaustive()
	}
}

#[async_trait]
impl TopicRetriever for ThrottledRetriever {
	async fn retrieve(&self, embed_url: &str, opts: &RetrieveOptions) -> ClResult<()> {
		let key = embed_url.to_lowercase();
		if !self.admit(&key) {
			debug!(embed_url, "Retrieval too soon, skipped");
			return Ok(());
		}

		let res = self.inner.retrieve(embed_url, opts).await;
		if res.is_err() {
			self.release(&key);
		}
		res
	}
}


// vim: ts=4
