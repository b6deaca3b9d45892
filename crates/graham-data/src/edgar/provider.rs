use super::{client::EdgarClient, fundamentals::annual_statements};
use crate::{
    error::{DataError, Result},
    listing::NyseListing,
    provider::DataProvider,
    yahoo::YahooPriceSource,
};
use async_trait::async_trait;
use graham_valuation::{CompanyProfile, StatementRecord};
use tracing::debug;

/// [`DataProvider`] backed by SEC filings, with prices from Yahoo Finance.
///
/// SEC data carries no sector or market capitalization. The SIC description
/// stands in for both sector and industry, and the market cap is left absent
/// so the market-cap floor never excludes EDGAR-sourced companies.
#[derive(Debug)]
pub struct EdgarProvider {
    client: EdgarClient,
    prices: YahooPriceSource,
    listing: NyseListing,
}

impl EdgarProvider {
    /// Create a provider with default clients.
    pub fn new() -> Result<Self> {
        Ok(Self::with_parts(
            EdgarClient::new()?,
            YahooPriceSource::new()?,
            NyseListing::new()?,
        ))
    }

    /// Assemble a provider from its clients.
    pub const fn with_parts(
        client: EdgarClient,
        prices: YahooPriceSource,
        listing: NyseListing,
    ) -> Self {
        Self {
            client,
            prices,
            listing,
        }
    }

    /// The underlying EDGAR client.
    pub const fn client(&self) -> &EdgarClient {
        &self.client
    }
}

#[async_trait]
impl DataProvider for EdgarProvider {
    fn name(&self) -> &str {
        "SEC EDGAR"
    }

    async fn company_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>> {
        let cik = match self.client.company_cik(ticker).await {
            Ok(cik) => cik,
            Err(DataError::CikNotFound(_)) => {
                debug!(ticker, "No CIK for ticker");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let submissions = self.client.submissions(&cik).await?;
        let sic = submissions.sic_description.unwrap_or_default();
        let mut profile = CompanyProfile::new(ticker, submissions.name, sic.clone(), sic);
        profile.exchange = submissions.exchanges.into_iter().next();
        Ok(Some(profile))
    }

    async fn financial_statements(
        &self,
        ticker: &str,
        years: usize,
    ) -> Result<Vec<StatementRecord>> {
        let cik = self.client.company_cik(ticker).await?;
        let facts = self.client.company_facts(&cik).await?;
        Ok(annual_statements(ticker, &facts, years))
    }

    async fn stock_price(&self, ticker: &str) -> Result<Option<f64>> {
        self.prices.latest_close(ticker).await
    }

    async fn listed_tickers(&self) -> Result<Vec<String>> {
        Ok(self.listing.tickers().await)
    }
}
