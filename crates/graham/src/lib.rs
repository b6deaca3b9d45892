#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/graham/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod providers;
pub mod screener;
pub mod universe;

// Re-export the member crates
pub use graham_data as data;
pub use graham_output as output;
pub use graham_screen as screen;
pub use graham_valuation as valuation;

pub use config::{CacheSettings, ProviderKind, ScreenerConfig, UniverseKind, default_cache_path};
pub use error::{Result, ScreenerError, TickerSkip};
pub use providers::{alpha_vantage_keys, build_provider};
pub use screener::{FilingSource, ScreenOutcome, Screener, SkippedTicker};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
