#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/graham/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod estimate;
pub mod methods;
pub mod metrics;
pub mod statement;
pub mod triangulate;
pub mod valuator;

pub use config::ValuationConfig;
pub use estimate::{Confidence, ValuationEstimate, ValuationMethod, margin_of_safety};
pub use methods::{AssetBased, ConservativeDcf, EarningsPowerValue, ValuationModel};
pub use metrics::{MetricsSnapshot, extract};
pub use statement::{CompanyProfile, RawValue, StatementKind, StatementRecord, line_items, safe_f64};
pub use triangulate::triangulate;
pub use valuator::Valuator;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
