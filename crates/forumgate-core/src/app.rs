//! App state type

use std::{path::Path, path::PathBuf, sync::Arc, time::Duration};

use forumgate_types::meta_adapter::MetaAdapter;
use forumgate_types::retriever::TopicRetriever;

use crate::extensions::Extensions;
use crate::prelude::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,

	pub meta_adapter: Arc<dyn MetaAdapter>,
	/// Already wrapped in whatever throttling the server configured
	pub retriever: Arc<dyn TopicRetriever>,

	// Type-erased extension map for feature-specific state
	pub extensions: Extensions,
}

impl AppState {
	/// Get a registered extension by type. Returns error if not found.
	pub fn ext<T: Send + Sync + 'static>(&self) -> ClResult<&T> {
		self.extensions.get::<T>().ok_or_else(|| {
			Error::Internal(format!("Extension {} not registered", std::any::type_name::<T>()))
		})
	}

	/// Prefix a site-relative path with the configured base path
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.opts.base_path, path)
	}
}

impl std::fmt::Debug for AppState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("AppState").field("opts", &self.opts).finish_non_exhaustive()
	}
}

pub type App = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	pub db_dir: Box<Path>,
	/// URL prefix for subfolder installs, without trailing slash
	pub base_path: Box<str>,
	/// Minimum delay between two retrievals of the same embed URL
	pub retrieve_throttle: Duration,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			db_dir: PathBuf::from("./data").into(),
			base_path: "".into(),
			retrieve_throttle: Duration::from_secs(60),
		}
	}
}

/// Normalize a configured base path: leading slash, no trailing slash
pub fn normalize_base_path(base_path: &str) -> Box<str> {
	let trimmed = base_path.trim().trim_matches('/');
	if trimmed.is_empty() { "".into() } else { format!("/{trimmed}").into() }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalize_base_path() {
		assert_eq!(&*normalize_base_path(""), "");
		assert_eq!(&*normalize_base_path("/"), "");
		assert_eq!(&*normalize_base_path("forum"), "/forum");
		assert_eq!(&*normalize_base_path("/forum/"), "/forum");
	}
}

// vim: ts=4
