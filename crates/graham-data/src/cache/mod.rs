//! Caching layer for provider responses.

mod provider;
pub mod sqlite;

pub use provider::CachedProvider;
pub use sqlite::{CacheStats, DEFAULT_MAX_AGE_DAYS, StatementCache};
