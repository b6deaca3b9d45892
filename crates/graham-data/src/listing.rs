//! Exchange listings from NASDAQ Trader symbol directories.

use crate::error::{DataError, Result};
use std::time::Duration;
use tracing::{info, warn};

/// NASDAQ Trader directory of non-NASDAQ listed securities.
pub const OTHER_LISTED_URL: &str = "https://www.nasdaqtrader.com/dynamic/SymDir/otherlisted.txt";

/// Exchange code used for NYSE in `otherlisted.txt`.
pub const NYSE_EXCHANGE_CODE: &str = "N";

/// Tickers used when the listing cannot be downloaded.
pub const FALLBACK_TICKERS: [&str; 5] = ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"];

/// Downloads and parses the NYSE listing.
#[derive(Debug, Clone)]
pub struct NyseListing {
    client: reqwest::Client,
    url: String,
}

impl NyseListing {
    /// Create a listing source pointing at [`OTHER_LISTED_URL`].
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: OTHER_LISTED_URL.to_string(),
        })
    }

    /// Point the listing at a different URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Download and parse the listing.
    pub async fn fetch(&self) -> Result<Vec<String>> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "Failed to fetch listing: HTTP {}",
                response.status()
            )));
        }
        let body = response.text().await?;
        let tickers = parse_other_listed(&body);
        info!(count = tickers.len(), "Found NYSE tickers");
        Ok(tickers)
    }

    /// Download the listing, falling back to [`FALLBACK_TICKERS`] on failure.
    pub async fn tickers(&self) -> Vec<String> {
        match self.fetch().await {
            Ok(tickers) if !tickers.is_empty() => tickers,
            Ok(_) => {
                warn!("Listing was empty, using fallback tickers");
                fallback_tickers()
            }
            Err(e) => {
                warn!(error = %e, "Error fetching NYSE tickers, using fallback tickers");
                fallback_tickers()
            }
        }
    }
}

/// [`FALLBACK_TICKERS`] as owned strings.
pub fn fallback_tickers() -> Vec<String> {
    FALLBACK_TICKERS.iter().map(|t| (*t).to_string()).collect()
}

/// Parse a pipe-delimited `otherlisted.txt` body into NYSE symbols.
///
/// The first line is a header and the last line a file-creation footer; both
/// are skipped. Symbols containing `.`, `^` or `$` (units, preferreds,
/// warrants) are excluded.
pub fn parse_other_listed(body: &str) -> Vec<String> {
    let lines: Vec<&str> = body.trim().lines().collect();
    if lines.len() < 3 {
        return Vec::new();
    }

    lines[1..lines.len() - 1]
        .iter()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            if parts.len() < 3 || parts[2].trim() != NYSE_EXCHANGE_CODE {
                return None;
            }
            let ticker = parts[0].trim();
            let excluded = ticker.is_empty() || ticker.contains(['.', '^', '$']);
            (!excluded).then(|| ticker.to_string())
        })
        .collect()
}
