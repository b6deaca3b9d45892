//! The data-provider capability.

use crate::error::Result;
use async_trait::async_trait;
use graham_valuation::{CompanyProfile, RawValue, StatementRecord};
use std::{fmt::Debug, sync::Arc};

/// A source of company profiles, statements, prices and ticker listings.
///
/// Implementations must tolerate partial data: a ticker with no profile or
/// price yields `Ok(None)`, and missing statements yield a shorter list.
#[async_trait]
pub trait DataProvider: Debug + Send + Sync {
    /// Human-readable provider name used in reports.
    fn name(&self) -> &str;

    /// Company profile, or `None` if the provider does not know the ticker.
    async fn company_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>>;

    /// Income, balance and cash-flow statements for up to `years` fiscal years.
    async fn financial_statements(&self, ticker: &str, years: usize)
    -> Result<Vec<StatementRecord>>;

    /// Latest price, or `None` if unavailable or not positive.
    async fn stock_price(&self, ticker: &str) -> Result<Option<f64>>;

    /// Tickers listed on the provider's default exchange.
    async fn listed_tickers(&self) -> Result<Vec<String>>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn company_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>> {
        (**self).company_profile(ticker).await
    }

    async fn financial_statements(
        &self,
        ticker: &str,
        years: usize,
    ) -> Result<Vec<StatementRecord>> {
        (**self).financial_statements(ticker, years).await
    }

    async fn stock_price(&self, ticker: &str) -> Result<Option<f64>> {
        (**self).stock_price(ticker).await
    }

    async fn listed_tickers(&self) -> Result<Vec<String>> {
        (**self).listed_tickers().await
    }
}

/// Convert a JSON value from a provider payload into a [`RawValue`].
///
/// Objects and arrays have no scalar meaning and map to `Null`.
pub fn raw_value(value: &serde_json::Value) -> RawValue {
    match value {
        serde_json::Value::Number(n) => n.as_f64().map_or(RawValue::Null, RawValue::Number),
        serde_json::Value::String(s) => RawValue::Text(s.clone()),
        _ => RawValue::Null,
    }
}
