//! Raw financial statement records and company profiles.
//!
//! Statements are keyed by the Alpha Vantage annual-report line-item names
//! (see [`line_items`]). Providers that source data elsewhere normalize to the
//! same vocabulary before handing records to the valuation core.

use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line-item keys understood by the metric extractor.
pub mod line_items {
    /// Total current assets (balance sheet).
    pub const TOTAL_CURRENT_ASSETS: &str = "totalCurrentAssets";
    /// Total current liabilities (balance sheet).
    pub const TOTAL_CURRENT_LIABILITIES: &str = "totalCurrentLiabilities";
    /// Total liabilities (balance sheet).
    pub const TOTAL_LIABILITIES: &str = "totalLiabilities";
    /// Shareholder equity as reported by Alpha Vantage (balance sheet).
    pub const TOTAL_SHAREHOLDER_EQUITY: &str = "totalShareholderEquity";
    /// Alternate spelling of shareholder equity used by other providers.
    pub const TOTAL_STOCKHOLDER_EQUITY: &str = "totalStockholderEquity";
    /// Short-term debt (balance sheet).
    pub const SHORT_TERM_DEBT: &str = "shortTermDebt";
    /// Long-term debt (balance sheet).
    pub const LONG_TERM_DEBT: &str = "longTermDebt";
    /// Common shares outstanding (balance sheet).
    pub const SHARES_OUTSTANDING: &str = "commonStockSharesOutstanding";
    /// Intangible assets excluding goodwill (balance sheet).
    pub const INTANGIBLE_ASSETS: &str = "intangibleAssets";
    /// Goodwill (balance sheet).
    pub const GOODWILL: &str = "goodwill";
    /// Net income (income statement).
    pub const NET_INCOME: &str = "netIncome";
    /// Depreciation and amortization (income statement).
    pub const DEPRECIATION_AND_AMORTIZATION: &str = "depreciationAndAmortization";
    /// Operating cash flow (cash flow statement).
    pub const OPERATING_CASHFLOW: &str = "operatingCashflow";
    /// Capital expenditures (cash flow statement).
    pub const CAPITAL_EXPENDITURES: &str = "capitalExpenditures";
    /// Depreciation, depletion and amortization (cash flow statement).
    pub const DEPRECIATION_DEPLETION_AND_AMORTIZATION: &str =
        "depreciationDepletionAndAmortization";
    /// Dividends paid, negative when cash flows out (cash flow statement).
    pub const DIVIDENDS_PAID: &str = "dividendsPaid";
}

/// Kind of financial statement.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    /// Income statement
    #[display("income")]
    Income,
    /// Balance sheet
    #[display("balance")]
    Balance,
    /// Cash flow statement
    #[display("cash_flow")]
    CashFlow,
}

impl StatementKind {
    /// All statement kinds, in fetch order.
    pub const ALL: [Self; 3] = [Self::Income, Self::Balance, Self::CashFlow];
}

/// A raw line-item value as delivered by a data provider.
///
/// Providers are inconsistent: numbers arrive as JSON numbers, as numeric
/// strings, as `"None"`, or not at all. Use [`RawValue::as_f64`] to read one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// A numeric value
    Number(f64),
    /// A textual value, possibly numeric
    Text(String),
    /// An explicit null
    Null,
}

impl RawValue {
    /// Safe numeric cast.
    ///
    /// Returns `None` for null, empty or non-numeric text, and non-finite
    /// numbers. Never panics and never substitutes zero.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                trimmed.parse::<f64>().ok()?
            }
            Self::Null => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Safe numeric cast of an optional raw value.
pub fn safe_f64(value: Option<&RawValue>) -> Option<f64> {
    value.and_then(RawValue::as_f64)
}

/// One financial statement for one fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRecord {
    /// Ticker symbol
    pub ticker: String,
    /// Fiscal year the statement covers
    pub fiscal_year: i32,
    /// Statement kind
    pub kind: StatementKind,
    /// Raw line items keyed by provider name
    pub fields: BTreeMap<String, RawValue>,
    /// Filing or fiscal period end date, if known
    pub filing_date: Option<NaiveDate>,
}

impl StatementRecord {
    /// Create an empty statement.
    pub fn new(ticker: impl Into<String>, fiscal_year: i32, kind: StatementKind) -> Self {
        Self {
            ticker: ticker.into(),
            fiscal_year,
            kind,
            fields: BTreeMap::new(),
            filing_date: None,
        }
    }

    /// Add a line item.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set the filing date.
    pub const fn with_filing_date(mut self, date: NaiveDate) -> Self {
        self.filing_date = Some(date);
        self
    }

    /// Numeric value of a line item, if present and numeric.
    pub fn value(&self, key: &str) -> Option<f64> {
        safe_f64(self.fields.get(key))
    }

    /// Numeric value of the first of several alias keys that is present.
    pub fn value_any(&self, keys: &[&str]) -> Option<f64> {
        keys.iter().find_map(|key| self.value(key))
    }
}

/// Descriptive company information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// Ticker symbol
    pub ticker: String,
    /// Company display name
    pub name: String,
    /// Sector
    pub sector: String,
    /// Industry
    pub industry: String,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Business description
    pub description: Option<String>,
    /// Listing exchange
    pub exchange: Option<String>,
}

impl CompanyProfile {
    /// Create a profile with the required fields.
    pub fn new(
        ticker: impl Into<String>,
        name: impl Into<String>,
        sector: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            sector: sector.into(),
            industry: industry.into(),
            market_cap: None,
            description: None,
            exchange: None,
        }
    }

    /// Set the market capitalization.
    pub const fn with_market_cap(mut self, market_cap: f64) -> Self {
        self.market_cap = Some(market_cap);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_cast_numeric_strings() {
        assert_eq!(RawValue::from("123.45").as_f64(), Some(123.45));
        assert_eq!(RawValue::from(" -30000000 ").as_f64(), Some(-30_000_000.0));
        assert_eq!(RawValue::from(42.0).as_f64(), Some(42.0));
        assert_eq!(RawValue::from(0.0).as_f64(), Some(0.0));
    }

    #[test]
    fn test_safe_cast_rejects_garbage() {
        assert_eq!(RawValue::Null.as_f64(), None);
        assert_eq!(RawValue::from("").as_f64(), None);
        assert_eq!(RawValue::from("None").as_f64(), None);
        assert_eq!(RawValue::from("invalid").as_f64(), None);
        assert_eq!(RawValue::from("NaN").as_f64(), None);
        assert_eq!(RawValue::from(f64::INFINITY).as_f64(), None);
        assert_eq!(safe_f64(None), None);
    }

    #[test]
    fn test_safe_cast_is_idempotent() {
        let raw = RawValue::from("17.5");
        let once = raw.as_f64();
        let twice = once.map(RawValue::from).and_then(|v| v.as_f64());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_value_any_uses_first_present_alias() {
        let stmt = StatementRecord::new("TEST", 2023, StatementKind::Balance)
            .with_field(line_items::TOTAL_SHAREHOLDER_EQUITY, "None")
            .with_field(line_items::TOTAL_STOCKHOLDER_EQUITY, "800");

        assert_eq!(
            stmt.value_any(&[
                line_items::TOTAL_SHAREHOLDER_EQUITY,
                line_items::TOTAL_STOCKHOLDER_EQUITY
            ]),
            Some(800.0)
        );
    }

    #[test]
    fn test_raw_value_deserializes_mixed_json() {
        let fields: BTreeMap<String, RawValue> =
            serde_json::from_str(r#"{"a": 1.5, "b": "2", "c": null, "d": "None"}"#).unwrap();

        assert_eq!(safe_f64(fields.get("a")), Some(1.5));
        assert_eq!(safe_f64(fields.get("b")), Some(2.0));
        assert_eq!(safe_f64(fields.get("c")), None);
        assert_eq!(safe_f64(fields.get("d")), None);
    }

    #[test]
    fn test_statement_kind_display() {
        assert_eq!(StatementKind::CashFlow.to_string(), "cash_flow");
        assert_eq!(StatementKind::Income.to_string(), "income");
    }
}
