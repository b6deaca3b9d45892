//! SEC EDGAR API client with rate limiting.

use crate::error::{DataError, Result};
use serde::{Deserialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OnceCell};
use tokio::time::{Instant, sleep};
use tracing::debug;

/// SEC EDGAR JSON API host
pub const EDGAR_DATA_URL: &str = "https://data.sec.gov";

/// SEC website host (ticker map and filing archives)
pub const SEC_WWW_URL: &str = "https://www.sec.gov";

/// Default rate limit: 10 requests per second (SEC requirement)
const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(100);

/// User agent for SEC EDGAR requests (SEC requires identifying information)
pub const USER_AGENT: &str = "Graham-Screener/0.1 (contact@example.com)";

/// Entry of `company_tickers.json`:
/// `{"0": {"cik_str": 320193, "ticker": "AAPL", "title": "Apple Inc."}, ...}`
#[derive(Debug, Deserialize)]
struct CompanyTicker {
    cik_str: u64,
    ticker: String,
}

/// Company metadata and filing index from the submissions API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submissions {
    /// CIK as reported (unpadded)
    pub cik: String,
    /// Registrant name
    pub name: String,
    /// Standard Industrial Classification description
    #[serde(default)]
    pub sic_description: Option<String>,
    /// Exchanges the registrant's securities trade on
    #[serde(default)]
    pub exchanges: Vec<String>,
    /// Filing history container
    pub filings: FilingsContainer,
}

/// Container for filings data
#[derive(Debug, Clone, Deserialize)]
pub struct FilingsContainer {
    /// Recent filings
    pub recent: FilingsRecent,
}

/// Recent filings as parallel arrays
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingsRecent {
    /// Accession numbers
    pub accession_number: Vec<String>,
    /// Filing dates
    pub filing_date: Vec<String>,
    /// Report dates
    #[serde(default)]
    pub report_date: Vec<String>,
    /// Form types (e.g., "10-K", "10-Q")
    pub form: Vec<String>,
    /// Primary documents
    pub primary_document: Vec<String>,
}

/// Response of the company-facts XBRL API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyFacts {
    /// Registrant name
    #[serde(default)]
    pub entity_name: String,
    /// Facts keyed by taxonomy (`us-gaap`, `dei`) then tag
    #[serde(default)]
    pub facts: HashMap<String, HashMap<String, TagFacts>>,
}

/// All reported values for one XBRL tag.
#[derive(Debug, Clone, Deserialize)]
pub struct TagFacts {
    /// Values keyed by unit (`USD`, `shares`)
    #[serde(default)]
    pub units: HashMap<String, Vec<FactValue>>,
}

/// A single reported value.
#[derive(Debug, Clone, Deserialize)]
pub struct FactValue {
    /// Period start for duration facts
    #[serde(default)]
    pub start: Option<String>,
    /// Period end (instant facts have only this)
    pub end: String,
    /// Value
    pub val: f64,
    /// Fiscal year of the filing that reported the value
    #[serde(default)]
    pub fy: Option<i32>,
    /// Fiscal period of the filing (`FY`, `Q1`..)
    #[serde(default)]
    pub fp: Option<String>,
    /// Form type of the filing
    #[serde(default)]
    pub form: Option<String>,
    /// Filing date
    #[serde(default)]
    pub filed: Option<String>,
}

/// Rate limiter to ensure we don't exceed SEC's rate limits
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// SEC EDGAR API client with rate limiting.
///
/// The ticker-to-CIK map is downloaded once per client and reused.
pub struct EdgarClient {
    client: reqwest::Client,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    data_url: String,
    www_url: String,
    ciks: OnceCell<HashMap<String, String>>,
}

impl EdgarClient {
    /// Create a new EDGAR client with default settings (10 req/sec)
    pub fn new() -> Result<Self> {
        Self::with_rate_limit(DEFAULT_RATE_LIMIT)
    }

    /// Create a new EDGAR client with a custom minimum interval between requests
    pub fn with_rate_limit(min_interval: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(min_interval))),
            data_url: EDGAR_DATA_URL.to_string(),
            www_url: SEC_WWW_URL.to_string(),
            ciks: OnceCell::new(),
        })
    }

    /// Point the client at different hosts for the JSON API and the website.
    pub fn with_base_urls(mut self, data_url: impl Into<String>, www_url: impl Into<String>) -> Self {
        self.data_url = data_url.into();
        self.www_url = www_url.into();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.rate_limiter.lock().await.wait().await;
        debug!(url, "EDGAR request");

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::EdgarApi(format!("{url}: HTTP {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| DataError::EdgarApi(format!("Failed to parse {url}: {e}")))
    }

    async fn cik_map(&self) -> Result<&HashMap<String, String>> {
        self.ciks
            .get_or_try_init(|| async {
                let url = format!("{}/files/company_tickers.json", self.www_url);
                let data: HashMap<String, CompanyTicker> = self.get_json(&url).await?;
                Ok::<_, DataError>(
                    data.into_values()
                        .map(|c| (c.ticker.to_uppercase(), pad_cik(&c.cik_str.to_string())))
                        .collect(),
                )
            })
            .await
    }

    /// Look up a company's CIK as a zero-padded 10-digit string.
    ///
    /// # Errors
    /// Returns `DataError::CikNotFound` if the ticker is not in the SEC map.
    pub async fn company_cik(&self, ticker: &str) -> Result<String> {
        if ticker.is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker".to_string()));
        }

        self.cik_map()
            .await?
            .get(&ticker.to_uppercase())
            .cloned()
            .ok_or_else(|| DataError::CikNotFound(ticker.to_string()))
    }

    /// Company metadata and recent filings.
    pub async fn submissions(&self, cik: &str) -> Result<Submissions> {
        if cik.is_empty() {
            return Err(DataError::InvalidSymbol("Empty CIK".to_string()));
        }
        let url = format!("{}/submissions/CIK{}.json", self.data_url, pad_cik(cik));
        self.get_json(&url).await
    }

    /// All XBRL facts the company has reported.
    pub async fn company_facts(&self, cik: &str) -> Result<CompanyFacts> {
        if cik.is_empty() {
            return Err(DataError::InvalidSymbol("Empty CIK".to_string()));
        }
        let url = format!(
            "{}/api/xbrl/companyfacts/CIK{}.json",
            self.data_url,
            pad_cik(cik)
        );
        self.get_json(&url).await
    }
}

impl std::fmt::Debug for EdgarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EdgarClient")
            .field("data_url", &self.data_url)
            .field("www_url", &self.www_url)
            .finish_non_exhaustive()
    }
}

/// Pad a CIK to the 10 digits SEC URLs require.
pub fn pad_cik(cik: &str) -> String {
    format!("{cik:0>10}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_cik() {
        assert_eq!(pad_cik("320193"), "0000320193");
        assert_eq!(pad_cik("0000320193"), "0000320193");
    }

    #[test]
    fn test_submissions_deserialize() {
        let json = r#"{
            "cik": "320193",
            "name": "Apple Inc.",
            "sicDescription": "Electronic Computers",
            "exchanges": ["Nasdaq"],
            "filings": {"recent": {
                "accessionNumber": ["0000320193-23-000106"],
                "filingDate": ["2023-11-03"],
                "reportDate": ["2023-09-30"],
                "form": ["10-K"],
                "primaryDocument": ["aapl-20230930.htm"]
            }}
        }"#;
        let submissions: Submissions = serde_json::from_str(json).unwrap();
        assert_eq!(submissions.name, "Apple Inc.");
        assert_eq!(submissions.sic_description.as_deref(), Some("Electronic Computers"));
        assert_eq!(submissions.filings.recent.form, vec!["10-K"]);
    }

    #[tokio::test]
    async fn test_rate_limiter_spaces_requests() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
