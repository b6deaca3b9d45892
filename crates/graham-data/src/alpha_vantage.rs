//! Alpha Vantage fundamentals and quotes.

use crate::{
    error::{DataError, Result},
    keys::{KeyRotation, key_suffix},
    listing::NyseListing,
    provider::{DataProvider, raw_value},
};
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use graham_valuation::{CompanyProfile, RawValue, StatementKind, StatementRecord, line_items};
use serde_json::Value;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};
use tracing::{debug, info, warn};

/// Alpha Vantage query endpoint.
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Key used when none is configured. Only serves Alpha Vantage's demo tickers.
pub const DEMO_KEY: &str = "demo";

/// Retries after a rate-limit response before giving up.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;

const PROVIDER: &str = "Alpha Vantage";
const DIVIDEND_PAYOUT: &str = "dividendPayout";

/// Alpha Vantage backed [`DataProvider`].
///
/// Rate-limit responses rotate the key through the owned [`KeyRotation`] and
/// retry after `retry_pause`.
pub struct AlphaVantageProvider {
    client: reqwest::Client,
    base_url: String,
    keys: KeyRotation,
    listing: NyseListing,
    retry_pause: Duration,
    request_count: AtomicU64,
}

impl std::fmt::Debug for AlphaVantageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageProvider")
            .field("base_url", &self.base_url)
            .field("keys", &self.keys.len())
            .field("retry_pause", &self.retry_pause)
            .finish_non_exhaustive()
    }
}

impl AlphaVantageProvider {
    /// Create a provider using the given keys.
    pub fn new(keys: KeyRotation) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
            keys,
            listing: NyseListing::new()?,
            retry_pause: Duration::from_secs(1),
            request_count: AtomicU64::new(0),
        })
    }

    /// Use a different query endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different listing source for [`DataProvider::listed_tickers`].
    pub fn with_listing(mut self, listing: NyseListing) -> Self {
        self.listing = listing;
        self
    }

    /// Pause between rate-limited retries.
    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    /// Successful requests made so far.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        let mut retries = 0;
        loop {
            let key = self.keys.current().unwrap_or(DEMO_KEY);
            let response = self
                .client
                .get(&self.base_url)
                .query(&[("function", function), ("symbol", symbol), ("apikey", key)])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(DataError::Http(format!(
                    "{PROVIDER} {function} for {symbol}: HTTP {}",
                    response.status()
                )));
            }

            let body: Value = response.json().await?;

            if let Some(note) = rate_limit_message(&body) {
                warn!(key = key_suffix(key), %note, "Rate limited");
                if retries >= MAX_RATE_LIMIT_RETRIES {
                    return Err(DataError::RateLimitExhausted {
                        attempts: retries + 1,
                    });
                }
                retries += 1;
                if let Some(next) = self.keys.rotate() {
                    info!(key = key_suffix(next), "Rotating API key");
                }
                tokio::time::sleep(self.retry_pause).await;
                continue;
            }

            if let Some(message) = body.get("Error Message").and_then(Value::as_str) {
                return Err(DataError::Api {
                    provider: PROVIDER,
                    message: message.to_string(),
                });
            }

            let count = self.request_count.fetch_add(1, Ordering::Relaxed) + 1;
            if count % 10 == 0 {
                info!(count, key = key_suffix(key), "Alpha Vantage requests made");
            }
            return Ok(body);
        }
    }
}

#[async_trait]
impl DataProvider for AlphaVantageProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn company_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>> {
        let body = self.query("OVERVIEW", ticker).await?;
        Ok(parse_overview(ticker, &body))
    }

    async fn financial_statements(
        &self,
        ticker: &str,
        years: usize,
    ) -> Result<Vec<StatementRecord>> {
        let mut statements = Vec::new();
        for kind in StatementKind::ALL {
            match self.query(statement_function(kind), ticker).await {
                Ok(body) => {
                    statements.extend(parse_annual_reports(ticker, kind, &body, years));
                }
                Err(e @ DataError::RateLimitExhausted { .. }) => return Err(e),
                Err(e) => warn!(ticker, %kind, error = %e, "Statement fetch failed"),
            }
        }
        Ok(statements)
    }

    async fn stock_price(&self, ticker: &str) -> Result<Option<f64>> {
        let body = self.query("GLOBAL_QUOTE", ticker).await?;
        Ok(parse_global_quote(&body))
    }

    async fn listed_tickers(&self) -> Result<Vec<String>> {
        Ok(self.listing.tickers().await)
    }
}

/// Alpha Vantage function name for a statement kind.
pub const fn statement_function(kind: StatementKind) -> &'static str {
    match kind {
        StatementKind::Income => "INCOME_STATEMENT",
        StatementKind::Balance => "BALANCE_SHEET",
        StatementKind::CashFlow => "CASH_FLOW",
    }
}

fn rate_limit_message(body: &Value) -> Option<&str> {
    ["Note", "Information"]
        .iter()
        .filter_map(|field| body.get(field).and_then(Value::as_str))
        .find(|text| {
            let lower = text.to_lowercase();
            lower.contains("call frequency") || lower.contains("rate limit")
        })
}

fn text_field(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "None")
        .map(str::to_string)
}

/// Parse an `OVERVIEW` response. An empty object means the ticker is unknown.
pub fn parse_overview(ticker: &str, body: &Value) -> Option<CompanyProfile> {
    let object = body.as_object()?;
    if object.is_empty() {
        return None;
    }

    let mut profile = CompanyProfile::new(
        ticker,
        text_field(body, "Name").unwrap_or_default(),
        text_field(body, "Sector").unwrap_or_default(),
        text_field(body, "Industry").unwrap_or_default(),
    );
    profile.market_cap = object.get("MarketCapitalization").and_then(|v| raw_value(v).as_f64());
    profile.description = text_field(body, "Description");
    profile.exchange = text_field(body, "Exchange");
    Some(profile)
}

/// Parse the `annualReports` array of a statement response, newest first,
/// keeping at most `years` reports.
///
/// Reports without a parseable `fiscalDateEnding` are skipped. Cash-flow
/// reports that carry a positive `dividendPayout` but no `dividendsPaid` get a
/// negative `dividendsPaid`, the sign convention the metric extractor counts.
pub fn parse_annual_reports(
    ticker: &str,
    kind: StatementKind,
    body: &Value,
    years: usize,
) -> Vec<StatementRecord> {
    let Some(reports) = body.get("annualReports").and_then(Value::as_array) else {
        debug!(ticker, %kind, "No annual reports in response");
        return Vec::new();
    };

    reports
        .iter()
        .take(years)
        .enumerate()
        .filter_map(|(index, report)| {
            let fields = report.as_object()?;
            let ending = fields.get("fiscalDateEnding").and_then(Value::as_str);
            let Some(date) = ending.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
            else {
                warn!(ticker, %kind, index, "Skipping report without a valid fiscalDateEnding");
                return None;
            };

            let mut record = StatementRecord::new(ticker, date.year(), kind)
                .with_filing_date(date);
            for (key, value) in fields {
                record.fields.insert(key.clone(), raw_value(value));
            }

            if kind == StatementKind::CashFlow
                && record.value(line_items::DIVIDENDS_PAID).is_none()
                && let Some(payout) = record.value(DIVIDEND_PAYOUT)
            {
                record
                    .fields
                    .insert(line_items::DIVIDENDS_PAID.to_string(), RawValue::Number(-payout.abs()));
            }
            Some(record)
        })
        .collect()
}

/// Parse a `GLOBAL_QUOTE` response into a positive price.
pub fn parse_global_quote(body: &Value) -> Option<f64> {
    body.get("Global Quote")
        .and_then(|quote| quote.get("05. price"))
        .and_then(|price| raw_value(price).as_f64())
        .filter(|price| *price > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_overview() {
        let body = json!({
            "Symbol": "IBM",
            "Name": "International Business Machines",
            "Sector": "TECHNOLOGY",
            "Industry": "COMPUTER & OFFICE EQUIPMENT",
            "MarketCapitalization": "158000000000",
            "Exchange": "NYSE",
            "Description": "None"
        });
        let profile = parse_overview("IBM", &body).unwrap();
        assert_eq!(profile.name, "International Business Machines");
        assert_eq!(profile.market_cap, Some(158_000_000_000.0));
        assert_eq!(profile.exchange.as_deref(), Some("NYSE"));
        assert_eq!(profile.description, None);
    }

    #[test]
    fn test_parse_overview_empty_object_is_unknown() {
        assert!(parse_overview("NOPE", &json!({})).is_none());
    }

    #[test]
    fn test_parse_annual_reports_truncates_and_dates() {
        let body = json!({
            "symbol": "IBM",
            "annualReports": [
                {"fiscalDateEnding": "2023-12-31", "netIncome": "7502000000"},
                {"fiscalDateEnding": "2022-12-31", "netIncome": "1639000000"},
                {"fiscalDateEnding": "2021-12-31", "netIncome": "5743000000"}
            ]
        });
        let records = parse_annual_reports("IBM", StatementKind::Income, &body, 2);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fiscal_year, 2023);
        assert_eq!(records[1].fiscal_year, 2022);
        assert_eq!(records[0].value(line_items::NET_INCOME), Some(7_502_000_000.0));
        assert_eq!(
            records[0].filing_date,
            NaiveDate::from_ymd_opt(2023, 12, 31)
        );
    }

    #[test]
    fn test_parse_annual_reports_skips_bad_dates() {
        let body = json!({
            "annualReports": [
                {"fiscalDateEnding": "not a date", "netIncome": "1"},
                {"netIncome": "2"},
                {"fiscalDateEnding": "2020-06-30", "netIncome": "3"}
            ]
        });
        let records = parse_annual_reports("X", StatementKind::Income, &body, 7);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fiscal_year, 2020);
    }

    #[test]
    fn test_dividend_payout_becomes_negative_dividends_paid() {
        let body = json!({
            "annualReports": [
                {"fiscalDateEnding": "2023-12-31", "dividendPayout": "6040000000"},
                {"fiscalDateEnding": "2022-12-31", "dividendPayout": "None"}
            ]
        });
        let records = parse_annual_reports("IBM", StatementKind::CashFlow, &body, 7);
        assert_eq!(
            records[0].value(line_items::DIVIDENDS_PAID),
            Some(-6_040_000_000.0)
        );
        assert_eq!(records[1].value(line_items::DIVIDENDS_PAID), None);
    }

    #[test]
    fn test_parse_global_quote() {
        let body = json!({"Global Quote": {"01. symbol": "IBM", "05. price": "182.5200"}});
        assert_eq!(parse_global_quote(&body), Some(182.52));
        assert_eq!(parse_global_quote(&json!({"Global Quote": {"05. price": "0"}})), None);
        assert_eq!(parse_global_quote(&json!({"Global Quote": {}})), None);
    }

    #[test]
    fn test_rate_limit_detection() {
        let note = json!({"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute"});
        let info = json!({"Information": "You have reached the rate limit for your key"});
        let other = json!({"Information": "The demo API key is for demo purposes only"});
        assert!(rate_limit_message(&note).is_some());
        assert!(rate_limit_message(&info).is_some());
        assert!(rate_limit_message(&other).is_none());
    }
}
