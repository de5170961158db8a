//! App builder

use std::{path::Path, sync::Arc, time::Duration};

use forumgate_core::app::{VERSION, normalize_base_path};
use forumgate_core::{AppBuilderOpts, AppState, Extensions};
use forumgate_embed::ThrottledRetriever;
use forumgate_meta_adapter_sqlite::MetaAdapterSqlite;
use forumgate_types::meta_adapter::MetaAdapter;
use forumgate_types::retriever::TopicRetriever;

use crate::prelude::*;
use crate::routes;

pub struct AppBuilder {
	opts: AppBuilderOpts,
	meta_adapter: Option<Arc<dyn MetaAdapter>>,
	retriever: Option<Arc<dyn TopicRetriever>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		AppBuilder { opts: AppBuilderOpts::default(), meta_adapter: None, retriever: None }
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn db_dir(&mut self, db_dir: impl Into<Box<Path>>) -> &mut Self {
		self.opts.db_dir = db_dir.into();
		self
	}
	pub fn base_path(&mut self, base_path: &str) -> &mut Self {
		self.opts.base_path = normalize_base_path(base_path);
		self
	}
	pub fn retrieve_throttle(&mut self, window: Duration) -> &mut Self {
		self.opts.retrieve_throttle = window;
		self
	}

	// Adapters
	pub fn meta_adapter(&mut self, meta_adapter: Arc<dyn MetaAdapter>) -> &mut Self {
		self.meta_adapter = Some(meta_adapter);
		self
	}
	pub fn retriever(&mut self, retriever: Arc<dyn TopicRetriever>) -> &mut Self {
		self.retriever = Some(retriever);
		self
	}

	/// Assemble the app state.
	///
	/// Adapters not set explicitly are served by a SQLite database in
	/// `db_dir`. The retriever is wrapped in the per-URL throttle unless the
	/// window is zero.
	pub async fn build(self) -> ClResult<App> {
		let (meta_adapter, retriever) = match (self.meta_adapter, self.retriever) {
			(Some(meta_adapter), Some(retriever)) => (meta_adapter, retriever),
			(meta_adapter, retriever) => {
				let sqlite = Arc::new(MetaAdapterSqlite::new(&self.opts.db_dir).await?);
				let meta_adapter =
					meta_adapter.unwrap_or_else(|| sqlite.clone() as Arc<dyn MetaAdapter>);
				let retriever = retriever.unwrap_or(sqlite as Arc<dyn TopicRetriever>);
				(meta_adapter, retriever)
			}
		};

		let retriever: Arc<dyn TopicRetriever> = if self.opts.retrieve_throttle.is_zero() {
			retriever
		} else {
			Arc::new(ThrottledRetriever::new(retriever, self.opts.retrieve_throttle))
		};

		let mut extensions = Extensions::new();
		forumgate_embed::init(&mut extensions)?;

		Ok(Arc::new(AppState { opts: self.opts, meta_adapter, retriever, extensions }))
	}

	pub async fn run(self) -> ClResult<()> {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		info!("forumgate V{}", VERSION);

		let app = self.build().await?;
		let router = routes::init(app.clone());

		let listener = tokio::net::TcpListener::bind(&*app.opts.listen).await?;
		info!("Listening on HTTP {}", app.opts.listen);
		if !app.opts.base_path.is_empty() {
			info!("Base path: {}", app.opts.base_path);
		}

		axum::serve(listener, router).await?;
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

// vim: ts=4
