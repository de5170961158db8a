pub use forumgate_types::prelude::*;

pub use crate::app::App;
pub use tracing::{debug_span, info_span, warn_span};

// vim: ts=4
