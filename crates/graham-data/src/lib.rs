#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/graham/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod alpha_vantage;
pub mod cache;
pub mod edgar;
pub mod error;
pub mod keys;
pub mod listing;
pub mod provider;
pub mod sample;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use cache::{CachedProvider, StatementCache};
pub use edgar::{EdgarClient, EdgarProvider, FilingRecord};
pub use error::{DataError, Result};
pub use keys::{KeyRotation, RotationStrategy};
pub use listing::NyseListing;
pub use provider::DataProvider;
pub use sample::SampleProvider;
pub use yahoo::YahooPriceSource;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
