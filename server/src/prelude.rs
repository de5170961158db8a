pub use forumgate_core::prelude::*;

// vim: ts=4
