//! Latest prices from Yahoo Finance.

use crate::error::Result;
use tracing::debug;
use yahoo_finance_api as yahoo;

/// Yahoo Finance latest-close lookup.
pub struct YahooPriceSource {
    connector: yahoo::YahooConnector,
}

impl std::fmt::Debug for YahooPriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooPriceSource").finish_non_exhaustive()
    }
}

impl YahooPriceSource {
    /// Create a price source.
    pub fn new() -> Result<Self> {
        Ok(Self {
            connector: yahoo::YahooConnector::new()?,
        })
    }

    /// Most recent daily close, or `None` if it is not a positive number.
    pub async fn latest_close(&self, ticker: &str) -> Result<Option<f64>> {
        let response = self.connector.get_latest_quotes(ticker, "1d").await?;
        let close = response.last_quote()?.close;
        debug!(ticker, close, "Yahoo latest close");
        Ok(positive_price(close))
    }
}

/// A usable price is finite and strictly positive.
pub fn positive_price(price: f64) -> Option<f64> {
    (price.is_finite() && price > 0.0).then_some(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_price() {
        assert_eq!(positive_price(12.5), Some(12.5));
        assert_eq!(positive_price(0.0), None);
        assert_eq!(positive_price(-1.0), None);
        assert_eq!(positive_price(f64::NAN), None);
    }
}
