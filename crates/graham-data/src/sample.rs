//! Deterministic offline data for dry runs.

use crate::{error::Result, provider::DataProvider};
use async_trait::async_trait;
use graham_valuation::{CompanyProfile, StatementKind, StatementRecord, line_items};

/// Tickers served by [`SampleProvider::listed_tickers`].
pub const MOCK_TICKERS: [&str; 15] = [
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "JPM", "JNJ", "V", "PG", "UNH", "HD",
    "MA", "DIS",
];

/// Most recent fiscal year in sample statements.
pub const SAMPLE_LATEST_YEAR: i32 = 2024;

const MILLION: f64 = 1_000_000.0;
const SHARES: f64 = 100.0 * MILLION;

/// Shape of a sample company's financials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleArchetype {
    /// Liquid, lightly levered and cheap: passes the Graham filter
    Value,
    /// Same fundamentals as `Value` at a price well above intrinsic value
    Expensive,
    /// Heavy long-term debt and thin liquidity
    Leveraged,
}

impl SampleArchetype {
    /// Archetype assigned to a ticker. Stable across runs.
    pub fn for_ticker(ticker: &str) -> Self {
        match ticker_seed(ticker) % 3 {
            0 => Self::Value,
            1 => Self::Expensive,
            _ => Self::Leveraged,
        }
    }

    const fn sector(self) -> (&'static str, &'static str) {
        match self {
            Self::Value => ("Industrials", "Specialty Industrial Machinery"),
            Self::Expensive => ("Technology", "Software"),
            Self::Leveraged => ("Utilities", "Utilities - Regulated Electric"),
        }
    }
}

fn ticker_seed(ticker: &str) -> u32 {
    ticker.bytes().map(u32::from).sum()
}

/// Share price for a sample ticker.
pub fn sample_price(ticker: &str) -> f64 {
    match SampleArchetype::for_ticker(ticker) {
        SampleArchetype::Expensive => 60.0,
        _ => 10.0 * (1.0 + f64::from(ticker_seed(ticker) % 5) * 0.1),
    }
}

/// Offline [`DataProvider`] that fabricates plausible statements for any
/// ticker. Used by `--dry-run`.
#[derive(Debug, Clone, Default)]
pub struct SampleProvider;

impl SampleProvider {
    /// Create a sample provider.
    pub const fn new() -> Self {
        Self
    }

    /// Statements for `years` fiscal years ending [`SAMPLE_LATEST_YEAR`].
    pub fn statements(ticker: &str, years: usize) -> Vec<StatementRecord> {
        let archetype = SampleArchetype::for_ticker(ticker);
        let (long_term_debt, current_liabilities) = match archetype {
            SampleArchetype::Leveraged => (2_500.0 * MILLION, 900.0 * MILLION),
            _ => (250.0 * MILLION, 400.0 * MILLION),
        };

        (0..years)
            .flat_map(|age| {
                let year = SAMPLE_LATEST_YEAR - age as i32;
                let net_income = 300.0 * MILLION / 1.05_f64.powi(age as i32);

                let income = StatementRecord::new(ticker, year, StatementKind::Income)
                    .with_field(line_items::NET_INCOME, net_income);
                let balance = StatementRecord::new(ticker, year, StatementKind::Balance)
                    .with_field(line_items::TOTAL_CURRENT_ASSETS, 1_000.0 * MILLION)
                    .with_field(line_items::TOTAL_CURRENT_LIABILITIES, current_liabilities)
                    .with_field(
                        line_items::TOTAL_LIABILITIES,
                        current_liabilities + long_term_debt - 150.0 * MILLION,
                    )
                    .with_field(line_items::TOTAL_SHAREHOLDER_EQUITY, 2_000.0 * MILLION)
                    .with_field(line_items::SHORT_TERM_DEBT, 50.0 * MILLION)
                    .with_field(line_items::LONG_TERM_DEBT, long_term_debt)
                    .with_field(line_items::SHARES_OUTSTANDING, SHARES);
                let cash_flow = StatementRecord::new(ticker, year, StatementKind::CashFlow)
                    .with_field(line_items::OPERATING_CASHFLOW, 400.0 * MILLION)
                    .with_field(line_items::CAPITAL_EXPENDITURES, -50.0 * MILLION)
                    .with_field(line_items::DIVIDENDS_PAID, -100.0 * MILLION);

                [income, balance, cash_flow]
            })
            .collect()
    }
}

#[async_trait]
impl DataProvider for SampleProvider {
    fn name(&self) -> &str {
        "Sample (offline)"
    }

    async fn company_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>> {
        let (sector, industry) = SampleArchetype::for_ticker(ticker).sector();
        let profile = CompanyProfile::new(ticker, format!("Mock {ticker}"), sector, industry)
            .with_market_cap(SHARES * sample_price(ticker));
        Ok(Some(profile))
    }

    async fn financial_statements(
        &self,
        ticker: &str,
        years: usize,
    ) -> Result<Vec<StatementRecord>> {
        Ok(Self::statements(ticker, years))
    }

    async fn stock_price(&self, ticker: &str) -> Result<Option<f64>> {
        Ok(Some(sample_price(ticker)))
    }

    async fn listed_tickers(&self) -> Result<Vec<String>> {
        Ok(MOCK_TICKERS.iter().map(|t| (*t).to_string()).collect())
    }
}
