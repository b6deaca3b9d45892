//! The screening pipeline.
//!
//! Tickers are fetched and valued in concurrent batches. A ticker that fails
//! anywhere (missing profile, too few statements, no price, provider error)
//! is logged and dropped without affecting the rest of its batch. Valued
//! candidates are filtered, ranked and written out.

use crate::config::ScreenerConfig;
use crate::error::{Result, TickerSkip};
use crate::universe::resolve_universe;
use chrono::{Datelike, Utc};
use futures::future::join_all;
use graham_data::edgar::mock_filings;
use graham_data::{DataProvider, EdgarClient, FilingRecord};
use graham_output::{
    AuditTrail, CompanyReport, ExportFormat, Exporter, OutputLayout, ScreenSummary, SummaryConfig,
};
use graham_screen::{Rejection, ScreenResult, apply_filters, evaluate, rank};
use graham_valuation::Valuator;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Where audit-trail filings come from.
#[derive(Debug)]
pub enum FilingSource {
    /// SEC EDGAR submissions
    Edgar(EdgarClient),
    /// Generated placeholder filings for offline runs
    Mock,
    /// No filings
    Disabled,
}

/// A ticker that produced no candidate, and why.
#[derive(Debug)]
pub struct SkippedTicker {
    /// Ticker symbol
    pub ticker: String,
    /// Reason it was dropped
    pub reason: TickerSkip,
}

/// What a run produced.
#[derive(Debug, Default)]
pub struct ScreenOutcome {
    /// Tickers attempted
    pub analyzed: usize,
    /// Ranked candidates that passed every filter, truncated to the top count
    pub ranked: Vec<ScreenResult>,
    /// Candidates that passed every filter, before truncation
    pub qualified: usize,
    /// Valued candidates that failed at least one filter
    pub rejected: Vec<Rejection>,
    /// Tickers dropped before filtering
    pub skipped: Vec<SkippedTicker>,
    /// Files written
    pub outputs: Vec<PathBuf>,
}

/// Runs a full screen against one data provider.
pub struct Screener {
    config: ScreenerConfig,
    provider: Arc<dyn DataProvider>,
    valuator: Valuator,
    filings: FilingSource,
}

impl std::fmt::Debug for Screener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screener")
            .field("provider", &self.provider.name())
            .field("filings", &self.filings)
            .finish_non_exhaustive()
    }
}

impl Screener {
    /// Create a screener. Dry runs use placeholder filings; other runs look
    /// filings up on SEC EDGAR.
    pub fn new(config: ScreenerConfig, provider: Arc<dyn DataProvider>) -> Result<Self> {
        let filings = if config.dry_run {
            FilingSource::Mock
        } else {
            FilingSource::Edgar(EdgarClient::new()?)
        };

        Ok(Self {
            valuator: Valuator::new(config.valuation),
            config,
            provider,
            filings,
        })
    }

    /// Replace the filing source.
    pub fn with_filing_source(mut self, filings: FilingSource) -> Self {
        self.filings = filings;
        self
    }

    /// Run configuration.
    pub const fn config(&self) -> &ScreenerConfig {
        &self.config
    }

    /// Output directory structure.
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.config.output_dir)
    }

    /// Run the screen.
    pub async fn run(&self) -> Result<ScreenOutcome> {
        self.run_with_progress(|_, _| {}).await
    }

    /// Run the screen, calling `on_progress(done, total)` after each batch.
    pub async fn run_with_progress(
        &self,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Result<ScreenOutcome> {
        self.config.validate()?;
        self.layout().create()?;

        info!(
            provider = self.provider.name(),
            dry_run = self.config.dry_run,
            "Starting Graham screen"
        );
        let tickers = resolve_universe(&self.config, self.provider.as_ref()).await?;
        if tickers.is_empty() {
            warn!("No tickers to screen");
        }

        let (results, skipped) = self.screen_tickers(&tickers, &mut on_progress).await;
        info!(
            valued = results.len(),
            skipped = skipped.len(),
            "Valuation complete"
        );

        let (qualified, rejected) = apply_filters(results, &self.config.criteria);
        let qualified_count = qualified.len();
        let mut ranked = rank(qualified);
        ranked.truncate(self.config.top_count);

        if ranked.is_empty() {
            warn!("No stocks passed Graham's criteria");
        } else {
            info!(count = ranked.len(), "Top Graham stocks selected");
        }

        let outputs = self.write_outputs(&ranked, &rejected).await?;

        Ok(ScreenOutcome {
            analyzed: tickers.len(),
            ranked,
            qualified: qualified_count,
            rejected,
            skipped,
            outputs,
        })
    }

    /// Value every ticker in batches of `batch_size`, pausing between batches.
    pub async fn screen_tickers(
        &self,
        tickers: &[String],
        on_progress: &mut impl FnMut(usize, usize),
    ) -> (Vec<ScreenResult>, Vec<SkippedTicker>) {
        let batches: Vec<&[String]> = tickers.chunks(self.config.batch_size).collect();
        let pause = self.config.batch_pause();
        let mut results = Vec::new();
        let mut skipped = Vec::new();
        let mut done = 0;

        for (index, batch) in batches.iter().enumerate() {
            debug!(
                batch = index + 1,
                batches = batches.len(),
                size = batch.len(),
                "Screening batch"
            );

            let outcomes = join_all(batch.iter().map(|ticker| self.screen_ticker(ticker))).await;
            for (ticker, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(reason) => {
                        if matches!(reason, TickerSkip::Data(_)) {
                            warn!(ticker = %ticker, %reason, "Failed to screen ticker");
                        } else {
                            debug!(ticker = %ticker, %reason, "Skipping ticker");
                        }
                        skipped.push(SkippedTicker {
                            ticker: ticker.clone(),
                            reason,
                        });
                    }
                }
            }

            done += batch.len();
            on_progress(done, tickers.len());
            info!("Processed {}/{} stocks", done, tickers.len());

            if index + 1 < batches.len() && !pause.is_zero() {
                sleep(pause).await;
            }
        }

        (results, skipped)
    }

    /// Fetch and value one ticker.
    pub async fn screen_ticker(&self, ticker: &str) -> std::result::Result<ScreenResult, TickerSkip> {
        let profile = self
            .provider
            .company_profile(ticker)
            .await?
            .ok_or(TickerSkip::NoProfile)?;

        if let (Some(min), Some(market_cap)) = (self.config.min_market_cap, profile.market_cap)
            && market_cap < min
        {
            return Err(TickerSkip::BelowMarketCap { market_cap, min });
        }

        let statements = self
            .provider
            .financial_statements(ticker, self.config.years)
            .await?;
        if statements.len() < self.config.min_statements {
            return Err(TickerSkip::InsufficientStatements {
                found: statements.len(),
                required: self.config.min_statements,
            });
        }

        let price = self
            .provider
            .stock_price(ticker)
            .await?
            .filter(|p| *p > 0.0)
            .ok_or(TickerSkip::NoPrice)?;

        evaluate(&profile, &statements, price, &self.valuator).map_err(TickerSkip::Valuation)
    }

    async fn filings_for(&self, ticker: &str) -> Vec<FilingRecord> {
        let today = Utc::now().date_naive();
        let years = u32::try_from(self.config.years).unwrap_or(u32::MAX);

        match &self.filings {
            FilingSource::Mock => mock_filings(ticker, years, today.year()),
            FilingSource::Edgar(client) => client
                .periodic_filings(ticker, years, today)
                .await
                .unwrap_or_else(|e| {
                    warn!(ticker, error = %e, "Could not fetch SEC filings");
                    Vec::new()
                }),
            FilingSource::Disabled => Vec::new(),
        }
    }

    /// Write summaries, rejections and per-company reports.
    async fn write_outputs(
        &self,
        ranked: &[ScreenResult],
        rejected: &[Rejection],
    ) -> Result<Vec<PathBuf>> {
        let layout = self.layout();
        let mut written = Vec::new();

        let summary = ScreenSummary::new(
            SummaryConfig {
                universe: self.config.universe_label(),
                top_count: self.config.top_count,
                years: self.config.years,
                min_margin_of_safety: self.config.criteria.min_margin_of_safety,
            },
            ranked.to_vec(),
        );

        let csv_path = layout.summary_path(self.config.top_count, ExportFormat::Csv);
        summary.export_to_file(&csv_path, ExportFormat::Csv)?;
        info!(path = %csv_path.display(), "Summary CSV saved");
        written.push(csv_path);

        let json_path = layout.summary_path(self.config.top_count, ExportFormat::PrettyJson);
        summary.export_to_file(&json_path, ExportFormat::PrettyJson)?;
        info!(path = %json_path.display(), "Summary JSON saved");
        written.push(json_path);

        let rejections_path = layout.rejections_path();
        rejected.export_to_file(&rejections_path, ExportFormat::Csv)?;
        written.push(rejections_path);

        for result in ranked {
            let filings = self.filings_for(&result.ticker).await;

            let report_path = layout.report_path(&result.ticker);
            CompanyReport::new(result)
                .with_valuation_config(self.config.valuation)
                .with_criteria(self.config.criteria)
                .with_data_provider(self.provider.name())
                .with_filings(&filings)
                .write_to(&report_path)?;
            info!(path = %report_path.display(), "Company report generated");
            written.push(report_path);

            let audit_path = layout.audit_path(&result.ticker);
            let audit = AuditTrail::new(
                result.ticker.clone(),
                filings,
                &self.config.valuation,
                &self.config.criteria,
            );
            std::fs::write(&audit_path, audit.to_json()?)?;
            written.push(audit_path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graham_data::SampleProvider;

    fn screener(dir: &std::path::Path) -> Screener {
        let config = ScreenerConfig {
            dry_run: true,
            output_dir: dir.to_path_buf(),
            ..ScreenerConfig::default()
        };
        Screener::new(config, Arc::new(SampleProvider::new())).unwrap()
    }

    #[tokio::test]
    async fn test_screen_ticker_values_sample_company() {
        let dir = tempfile::tempdir().unwrap();
        let result = screener(dir.path()).screen_ticker("NVDA").await.unwrap();
        assert_eq!(result.ticker, "NVDA");
        assert!(result.intrinsic_value > result.current_price);
        assert_eq!(result.valuations.len(), 3);
    }

    #[tokio::test]
    async fn test_insufficient_statements() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScreenerConfig {
            dry_run: true,
            years: 3,
            output_dir: dir.path().to_path_buf(),
            ..ScreenerConfig::default()
        };
        let screener = Screener::new(config, Arc::new(SampleProvider::new())).unwrap();

        let skip = screener.screen_ticker("NVDA").await.unwrap_err();
        assert!(matches!(
            skip,
            TickerSkip::InsufficientStatements {
                found: 9,
                required: 15
            }
        ));
    }

    #[tokio::test]
    async fn test_market_cap_floor() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScreenerConfig {
            dry_run: true,
            min_market_cap: Some(1.0e12),
            output_dir: dir.path().to_path_buf(),
            ..ScreenerConfig::default()
        };
        let screener = Screener::new(config, Arc::new(SampleProvider::new())).unwrap();

        assert!(matches!(
            screener.screen_ticker("NVDA").await,
            Err(TickerSkip::BelowMarketCap { .. })
        ));
    }

    #[tokio::test]
    async fn test_batches_report_progress() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = ScreenerConfig {
            dry_run: true,
            output_dir: dir.path().to_path_buf(),
            ..ScreenerConfig::default()
        };
        config.batch_size = 4;
        let screener = Screener::new(config, Arc::new(SampleProvider::new())).unwrap();
        let tickers: Vec<String> = ["NVDA", "JPM", "AAPL", "MSFT", "V", "KO"]
            .iter()
            .map(|t| (*t).to_string())
            .collect();

        let mut progress = Vec::new();
        let (results, skipped) = screener
            .screen_tickers(&tickers, &mut |done, total| progress.push((done, total)))
            .await;

        assert_eq!(progress, vec![(4, 6), (6, 6)]);
        assert_eq!(results.len() + skipped.len(), 6);
    }
}
