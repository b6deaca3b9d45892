//! Screener configuration.
//!
//! Every setting has a default. A JSON file may supply any subset of them
//! and command-line flags are applied on top.

use crate::error::{Result, ScreenerError};
use derive_more::Display;
use graham_data::cache::DEFAULT_MAX_AGE_DAYS;
use graham_screen::GrahamCriteria;
use graham_valuation::ValuationConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Provider names that are recognized but have no implementation.
pub const UNIMPLEMENTED_PROVIDERS: [&str; 3] = ["fmp", "tiingo", "polygon"];

/// Source of fundamentals and prices.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Alpha Vantage REST API
    #[default]
    #[display("alpha-vantage")]
    AlphaVantage,
    /// SEC EDGAR company facts with Yahoo Finance prices
    #[display("edgar")]
    Edgar,
    /// Deterministic offline data
    #[display("sample")]
    Sample,
}

impl FromStr for ProviderKind {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_lowercase().replace('_', "-");
        match name.as_str() {
            "alpha-vantage" | "alphavantage" => Ok(Self::AlphaVantage),
            "edgar" | "sec" => Ok(Self::Edgar),
            "sample" | "mock" => Ok(Self::Sample),
            other if UNIMPLEMENTED_PROVIDERS.contains(&other) => {
                Err(ScreenerError::ProviderNotImplemented(other.to_string()))
            }
            _ => Err(ScreenerError::UnknownProvider(s.to_string())),
        }
    }
}

/// Exchange universe to screen when no ticker file is given.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniverseKind {
    /// NYSE-listed common stocks
    #[default]
    #[display("nyse")]
    Nyse,
    /// NASDAQ (served from the NYSE listing)
    #[display("nasdaq")]
    Nasdaq,
    /// All exchanges (served from the NYSE listing)
    #[display("all")]
    All,
}

impl FromStr for UniverseKind {
    type Err = ScreenerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nyse" => Ok(Self::Nyse),
            "nasdaq" => Ok(Self::Nasdaq),
            "all" => Ok(Self::All),
            _ => Err(ScreenerError::Config(format!("Unknown universe: {s}"))),
        }
    }
}

/// Statement cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Use the cache (default: true)
    pub enabled: bool,
    /// Database path (default: [`default_cache_path`])
    pub path: Option<PathBuf>,
    /// Entries older than this are refetched (default: 7)
    pub max_age_days: i64,
    /// Ignore cached entries but still write fresh ones (default: false)
    pub refresh: bool,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            refresh: false,
        }
    }
}

impl CacheSettings {
    /// Configured path or the platform default.
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(default_cache_path)
    }
}

/// Platform cache location for the statement database.
///
/// - Linux: `~/.cache/graham/statements.db`
/// - macOS: `~/Library/Caches/graham/statements.db`
/// - Windows: `%LOCALAPPDATA%\graham\statements.db`
pub fn default_cache_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("graham")
        .join("statements.db")
}

/// Settings for a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// Exchange universe (default: nyse)
    pub universe: UniverseKind,
    /// CSV of tickers to screen instead of the universe
    pub tickers_csv: Option<PathBuf>,
    /// Number of ranked candidates kept (default: 10)
    pub top_count: usize,
    /// Years of statements requested (default: 7)
    pub years: usize,
    /// Skip companies whose known market cap is below this
    pub min_market_cap: Option<f64>,
    /// Data provider (default: alpha-vantage)
    pub provider: ProviderKind,
    /// Output directory (default: `output`)
    pub output_dir: PathBuf,
    /// Use offline sample data and skip every network call
    pub dry_run: bool,
    /// Screen a random sample of this many tickers
    pub random_sample: Option<usize>,
    /// Tickers fetched concurrently (default: 10)
    pub batch_size: usize,
    /// Pause between batches in milliseconds (default: 1000, skipped in dry run)
    pub batch_pause_ms: u64,
    /// Statements required before valuing a company (default: 15)
    pub min_statements: usize,
    /// Valuation multipliers
    pub valuation: ValuationConfig,
    /// Filter thresholds
    pub criteria: GrahamCriteria,
    /// Statement cache
    pub cache: CacheSettings,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            universe: UniverseKind::default(),
            tickers_csv: None,
            top_count: 10,
            years: 7,
            min_market_cap: None,
            provider: ProviderKind::default(),
            output_dir: PathBuf::from("output"),
            dry_run: false,
            random_sample: None,
            batch_size: 10,
            batch_pause_ms: 1000,
            min_statements: 15,
            valuation: ValuationConfig::default(),
            criteria: GrahamCriteria::default(),
            cache: CacheSettings::default(),
        }
    }
}

impl ScreenerConfig {
    /// Load settings from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Reject settings no run can use.
    pub fn validate(&self) -> Result<()> {
        if self.top_count == 0 {
            return Err(ScreenerError::Config("top count must be at least 1".to_string()));
        }
        if self.years == 0 {
            return Err(ScreenerError::Config("years must be at least 1".to_string()));
        }
        if self.batch_size == 0 {
            return Err(ScreenerError::Config("batch size must be at least 1".to_string()));
        }
        if self.random_sample == Some(0) {
            return Err(ScreenerError::Config(
                "random sample must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Provider actually used: dry runs always use sample data.
    pub const fn effective_provider(&self) -> ProviderKind {
        if self.dry_run {
            ProviderKind::Sample
        } else {
            self.provider
        }
    }

    /// Pause between batches, zero in dry run.
    pub const fn batch_pause(&self) -> Duration {
        if self.dry_run {
            Duration::ZERO
        } else {
            Duration::from_millis(self.batch_pause_ms)
        }
    }

    /// Universe label recorded in the summary.
    pub fn universe_label(&self) -> String {
        self.tickers_csv
            .as_ref()
            .map_or_else(|| self.universe.to_string(), |p| p.display().to_string())
    }
}
