//! Command-line arguments and how they override the run configuration.

use clap::Parser;
use graham::{ProviderKind, ScreenerConfig, UniverseKind};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "graham-scan")]
#[command(about = "Graham: screen equities for deep value with Benjamin Graham's criteria", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Exchange universe to screen (nyse, nasdaq or all)
    #[arg(long)]
    pub(crate) universe: Option<String>,

    /// CSV file whose first column lists the tickers to screen
    #[arg(long)]
    pub(crate) tickers_csv: Option<PathBuf>,

    /// Number of top stocks to report
    #[arg(long)]
    pub(crate) top: Option<usize>,

    /// Years of financial history to analyze
    #[arg(long)]
    pub(crate) years: Option<usize>,

    /// Minimum market capitalization in dollars
    #[arg(long)]
    pub(crate) min_market_cap: Option<f64>,

    /// Data provider (alpha-vantage, edgar or sample)
    #[arg(long)]
    pub(crate) data_provider: Option<String>,

    /// Alpha Vantage API key(s), comma-separated (default: environment)
    #[arg(long)]
    pub(crate) api_key: Option<String>,

    /// Directory for reports and summaries
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short)]
    pub(crate) verbose: bool,

    /// Use offline sample data instead of calling any API
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Screen a random sample of N tickers from the universe
    #[arg(long)]
    pub(crate) random_sample: Option<usize>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Disable the statement cache
    #[arg(long)]
    pub(crate) no_cache: bool,

    /// Refetch statements even when cached
    #[arg(long)]
    pub(crate) refresh: bool,
}

impl Cli {
    /// Start from the config file (or defaults) and apply every flag given.
    pub(crate) fn screener_config(&self) -> graham::Result<ScreenerConfig> {
        let mut config = match &self.config {
            Some(path) => ScreenerConfig::from_json_file(path)?,
            None => ScreenerConfig::default(),
        };

        if let Some(universe) = &self.universe {
            config.universe = UniverseKind::from_str(universe)?;
        }
        if let Some(path) = &self.tickers_csv {
            config.tickers_csv = Some(path.clone());
        }
        if let Some(top) = self.top {
            config.top_count = top;
        }
        if let Some(years) = self.years {
            config.years = years;
        }
        if self.min_market_cap.is_some() {
            config.min_market_cap = self.min_market_cap;
        }
        if let Some(provider) = &self.data_provider {
            config.provider = ProviderKind::from_str(provider)?;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if self.random_sample.is_some() {
            config.random_sample = self.random_sample;
        }
        config.dry_run |= self.dry_run;
        if self.no_cache {
            config.cache.enabled = false;
        }
        config.cache.refresh |= self.refresh;

        config.validate()?;
        Ok(config)
    }
}
