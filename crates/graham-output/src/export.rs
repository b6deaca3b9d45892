//! Summary exports for a screening run.
//!
//! Ranked candidates are written as `top_<N>.csv` (one formatted row per
//! company) and `top_<N>.json` (screen date, the thresholds used and every
//! result in full). Candidates that failed a filter go to `rejections.csv`.

use chrono::{DateTime, Utc};
use graham_screen::{Rejection, ScreenResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Placeholder for a metric that could not be computed.
pub const NOT_AVAILABLE: &str = "N/A";

/// `12.34` with two decimals, or `N/A`.
pub fn format_ratio(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

/// A fraction as a percentage with one decimal (`0.456` -> `45.6%`).
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// A per-share dollar amount (`$12.34`).
pub fn format_dollars(value: f64) -> String {
    format!("${value:.2}")
}

/// One line of `top_<N>.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// 1-based rank
    #[serde(rename = "Rank")]
    pub rank: usize,
    /// Ticker symbol
    #[serde(rename = "Ticker")]
    pub ticker: String,
    /// Company name
    #[serde(rename = "Company")]
    pub company: String,
    /// Sector
    #[serde(rename = "Sector")]
    pub sector: String,
    /// Price, e.g. `$10.00`
    #[serde(rename = "Current Price")]
    pub current_price: String,
    /// Triangulated value, e.g. `$29.90`
    #[serde(rename = "Intrinsic Value")]
    pub intrinsic_value: String,
    /// Overall margin of safety, e.g. `66.6%`
    #[serde(rename = "Margin of Safety")]
    pub margin_of_safety: String,
    /// Composite score with one decimal
    #[serde(rename = "Graham Score")]
    pub graham_score: String,
    /// Current ratio or `N/A`
    #[serde(rename = "Current Ratio")]
    pub current_ratio: String,
    /// Debt to equity or `N/A`
    #[serde(rename = "Debt/Equity")]
    pub debt_to_equity: String,
    /// P/E or `N/A`
    #[serde(rename = "PE Ratio")]
    pub pe_ratio: String,
    /// P/B or `N/A`
    #[serde(rename = "PB Ratio")]
    pub pb_ratio: String,
    /// Return on equity as a percentage or `N/A`
    #[serde(rename = "ROE")]
    pub roe: String,
}

impl From<&ScreenResult> for SummaryRow {
    fn from(result: &ScreenResult) -> Self {
        let metrics = &result.metrics;
        Self {
            rank: result.rank,
            ticker: result.ticker.clone(),
            company: result.company_name.clone(),
            sector: result.sector.clone(),
            current_price: format_dollars(result.current_price),
            intrinsic_value: format_dollars(result.intrinsic_value),
            margin_of_safety: format_percent(result.margin_of_safety),
            graham_score: format!("{:.1}", result.graham_score),
            current_ratio: format_ratio(metrics.current_ratio),
            debt_to_equity: format_ratio(metrics.debt_to_equity),
            pe_ratio: format_ratio(metrics.pe_ratio),
            pb_ratio: format_ratio(metrics.pb_ratio),
            roe: metrics
                .roe
                .map_or_else(|| NOT_AVAILABLE.to_string(), format_percent),
        }
    }
}

/// Run settings recorded alongside the results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Universe screened (`nyse`, a CSV path, ...)
    pub universe: String,
    /// Number of top candidates kept
    pub top_count: usize,
    /// Years of statements requested
    pub years: usize,
    /// Minimum margin of safety required by the filter
    pub min_margin_of_safety: f64,
}

/// Ranked output of a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSummary {
    /// When the screen ran
    pub screen_date: DateTime<Utc>,
    /// Settings used
    pub config: SummaryConfig,
    /// Ranked candidates, best first
    pub stocks: Vec<ScreenResult>,
}

impl ScreenSummary {
    /// Create a summary stamped with the current time.
    pub fn new(config: SummaryConfig, stocks: Vec<ScreenResult>) -> Self {
        Self {
            screen_date: Utc::now(),
            config,
            stocks,
        }
    }

    /// Override the screen date.
    pub const fn with_screen_date(mut self, screen_date: DateTime<Utc>) -> Self {
        self.screen_date = screen_date;
        self
    }

    /// Formatted table rows in rank order.
    pub fn rows(&self) -> Vec<SummaryRow> {
        self.stocks.iter().map(SummaryRow::from).collect()
    }
}

/// One line of `rejections.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionRow {
    /// Ticker symbol
    pub ticker: String,
    /// Composite score the candidate still earned
    pub graham_score: f64,
    /// Violated rules joined with `; `
    pub reasons: String,
}

impl From<&Rejection> for RejectionRow {
    fn from(rejection: &Rejection) -> Self {
        Self {
            ticker: rejection.ticker.clone(),
            graham_score: rejection.graham_score,
            reasons: rejection.outcome.reasons().join("; "),
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn to_csv<T: Serialize>(records: impl IntoIterator<Item = T>) -> Result<String, ExportError> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

impl Exporter for ScreenSummary {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(self.rows()),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for [Rejection] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv(self.iter().map(RejectionRow::from)),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}
