pub use crate::error::{ClResult, Error};
pub use crate::types::{CategoryId, PostId, Timestamp, TopicId, UserId};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
