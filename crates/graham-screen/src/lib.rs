#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/graham/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod criteria;
pub mod filter;
pub mod rank;
pub mod result;
pub mod score;

pub use criteria::{GrahamCriteria, MAX_PE_TIMES_PB};
pub use filter::{FilterFailure, FilterOutcome, Rejection, apply_filters, check};
pub use rank::rank;
pub use result::{InvestmentThesis, ScreenResult, SkipReason, evaluate};
pub use score::{ScoreBreakdown, ScoreInterpretation, score};
