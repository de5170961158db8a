use std::{env, path::PathBuf, time::Duration};

use forumgate_server::AppBuilder;
use forumgate_types::error::{ClResult, Error};

fn env_or(name: &str, default: &str) -> String {
	env::var(name).unwrap_or_else(|_| default.to_string())
}

#[tokio::main]
async fn main() -> ClResult<()> {
	let throttle_secs = env_or("RETRIEVE_THROTTLE_SECS", "60")
		.trim()
		.parse::<u64>()
		.map_err(|_| Error::ValidationError("RETRIEVE_THROTTLE_SECS must be a number".into()))?;

	let mut builder = AppBuilder::new();
	builder
		.listen(env_or("LISTEN", "127.0.0.1:8080"))
		.db_dir(PathBuf::from(env_or("DB_DIR", "./data")))
		.base_path(&env_or("BASE_PATH", ""))
		.retrieve_throttle(Duration::from_secs(throttle_secs));

	builder.run().await
}

// vim: ts=4
