#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/graham/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod export;
pub mod layout;
pub mod report;

pub use audit::{Adjustment, AuditTrail, DataSources, Methodology, conservative_adjustments};
pub use export::{
    ExportError, ExportFormat, Exporter, RejectionRow, ScreenSummary, SummaryConfig, SummaryRow,
};
pub use layout::OutputLayout;
pub use report::{CompanyReport, ReportError};
