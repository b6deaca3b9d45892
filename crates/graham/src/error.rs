//! Error types for the screening pipeline.

use graham_data::DataError;
use graham_output::{ExportError, ReportError};
use graham_screen::SkipReason;
use thiserror::Error;

/// Result type for screener operations.
pub type Result<T> = std::result::Result<T, ScreenerError>;

/// Errors that abort a screening run.
#[derive(Debug, Error)]
pub enum ScreenerError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A recognized provider with no implementation
    #[error("Data provider '{0}' is not implemented (use alpha-vantage, edgar or sample)")]
    ProviderNotImplemented(String),

    /// An unrecognized provider name
    #[error("Unknown data provider: {0}")]
    UnknownProvider(String),

    /// Data provider error
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    /// Summary export error
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Company report error
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single ticker dropped out of the pipeline.
///
/// Never aborts the run: the ticker is logged and excluded.
#[derive(Debug, Error)]
pub enum TickerSkip {
    /// Provider has no profile for the ticker
    #[error("no company profile")]
    NoProfile,

    /// Known market cap below the configured floor
    #[error("market cap {market_cap:.0} below minimum {min:.0}")]
    BelowMarketCap {
        /// Reported market cap
        market_cap: f64,
        /// Configured floor
        min: f64,
    },

    /// Too few statements to value the company
    #[error("only {found} statements, need {required}")]
    InsufficientStatements {
        /// Statements returned
        found: usize,
        /// Statements required
        required: usize,
    },

    /// No positive price
    #[error("no price available")]
    NoPrice,

    /// Valuation produced nothing usable
    #[error("{0}")]
    Valuation(SkipReason),

    /// Provider failure for this ticker
    #[error("data error: {0}")]
    Data(#[from] DataError),
}
