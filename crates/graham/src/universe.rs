//! The set of tickers a run screens.

use crate::config::{ScreenerConfig, UniverseKind};
use crate::error::Result;
use graham_data::DataProvider;
use rand::Rng;
use rand::seq::SliceRandom;
use std::path::Path;
use tracing::{info, warn};

/// Tickers from the first column of a CSV file with a header row.
///
/// Symbols are trimmed and upper-cased; blank cells are skipped.
pub fn load_tickers_csv(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut tickers = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(symbol) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) {
            tickers.push(symbol.to_uppercase());
        }
    }

    info!(count = tickers.len(), path = %path.display(), "Loaded tickers from CSV");
    Ok(tickers)
}

/// A random subset of `count` tickers, or all of them when there are fewer.
pub fn random_sample<R: Rng + ?Sized>(tickers: &[String], count: usize, rng: &mut R) -> Vec<String> {
    if count >= tickers.len() {
        return tickers.to_vec();
    }
    tickers.choose_multiple(rng, count).cloned().collect()
}

/// Resolve the tickers to screen for a run.
///
/// A ticker CSV takes precedence over the exchange universe. NASDAQ and
/// all-exchange universes are served from the provider's NYSE listing.
pub async fn resolve_universe(
    config: &ScreenerConfig,
    provider: &dyn DataProvider,
) -> Result<Vec<String>> {
    let tickers = if let Some(path) = &config.tickers_csv {
        load_tickers_csv(path)?
    } else {
        if config.universe != UniverseKind::Nyse {
            warn!(
                universe = %config.universe,
                "Universe not available separately, using the NYSE listing"
            );
        }
        provider.listed_tickers().await?
    };

    let tickers = match config.random_sample {
        Some(count) if count < tickers.len() => {
            info!(
                sample = count,
                universe = tickers.len(),
                "Randomly sampling tickers"
            );
            random_sample(&tickers, count, &mut rand::thread_rng())
        }
        _ => tickers,
    };

    info!(count = tickers.len(), "Screening universe resolved");
    Ok(tickers)
}
