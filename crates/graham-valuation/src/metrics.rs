//! Metric extraction.
//!
//! Collapses a multi-year set of statements into a [`MetricsSnapshot`] for the
//! latest fiscal year present. Every ratio that needs a positive denominator is
//! absent when the denominator is missing or not positive.

use crate::{
    config::ValuationConfig,
    statement::{CompanyProfile, StatementKind, StatementRecord, line_items},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Share of operating cash flow kept as owner earnings when neither capex nor
/// depreciation is reported.
pub const FLAT_MAINTENANCE_RETENTION: f64 = 0.8;

/// Minimum number of income statements needed for a growth rate.
pub const MIN_GROWTH_YEARS: usize = 3;

const EQUITY_KEYS: [&str; 2] = [
    line_items::TOTAL_SHAREHOLDER_EQUITY,
    line_items::TOTAL_STOCKHOLDER_EQUITY,
];

/// Normalized metrics for one ticker at its latest fiscal year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Ticker symbol
    pub ticker: String,
    /// Current assets / current liabilities
    pub current_ratio: Option<f64>,
    /// (short-term + long-term debt) / equity
    pub debt_to_equity: Option<f64>,
    /// Equity / shares outstanding
    pub book_value_per_share: Option<f64>,
    /// Net income / shares outstanding
    pub earnings_per_share: Option<f64>,
    /// Price / earnings per share
    pub pe_ratio: Option<f64>,
    /// Price / book value per share
    pub pb_ratio: Option<f64>,
    /// Net income / equity
    pub roe: Option<f64>,
    /// Net income CAGR over the full income-statement history
    pub earnings_growth: Option<f64>,
    /// Number of years with a dividend outflow
    pub dividend_years: u32,
    /// Operating cash flow less estimated maintenance capex
    pub owner_earnings: Option<f64>,
    /// (current assets - total liabilities) / shares outstanding
    pub ncav_per_share: Option<f64>,
    /// (equity - intangibles - goodwill) / shares outstanding
    pub tangible_book_value: Option<f64>,
}

impl MetricsSnapshot {
    /// A snapshot with only the ticker populated.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }
}

/// Statements grouped by kind, then by fiscal year.
///
/// A later statement for the same kind and year replaces an earlier one.
type ByKind<'a> = BTreeMap<StatementKind, BTreeMap<i32, &'a StatementRecord>>;

fn group(statements: &[StatementRecord]) -> ByKind<'_> {
    let mut by_kind = ByKind::new();
    for stmt in statements {
        by_kind
            .entry(stmt.kind)
            .or_default()
            .insert(stmt.fiscal_year, stmt);
    }
    by_kind
}

fn latest<'a>(by_kind: &ByKind<'a>, kind: StatementKind, year: i32) -> Option<&'a StatementRecord> {
    by_kind.get(&kind).and_then(|years| years.get(&year)).copied()
}

/// `numerator / denominator` when both are present and the denominator is positive.
fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(n), Some(d)) if d > 0.0 => Some(n / d),
        _ => None,
    }
}

/// Build a metrics snapshot from raw statements.
///
/// Only the latest fiscal year drives the point-in-time ratios; growth and
/// dividend history use every year supplied. An empty statement list yields
/// [`MetricsSnapshot::empty`].
pub fn extract(
    statements: &[StatementRecord],
    profile: &CompanyProfile,
    current_price: f64,
    config: &ValuationConfig,
) -> MetricsSnapshot {
    let mut metrics = MetricsSnapshot::empty(profile.ticker.clone());

    let Some(latest_year) = statements.iter().map(|s| s.fiscal_year).max() else {
        return metrics;
    };
    let by_kind = group(statements);

    let balance = latest(&by_kind, StatementKind::Balance, latest_year);
    let income = latest(&by_kind, StatementKind::Income, latest_year);
    let cash_flow = latest(&by_kind, StatementKind::CashFlow, latest_year);

    if let Some(balance) = balance {
        let current_assets = balance.value(line_items::TOTAL_CURRENT_ASSETS);
        let current_liabilities = balance.value(line_items::TOTAL_CURRENT_LIABILITIES);
        let total_liabilities = balance.value(line_items::TOTAL_LIABILITIES);
        let equity = balance.value_any(&EQUITY_KEYS);
        let shares = balance.value(line_items::SHARES_OUTSTANDING);

        metrics.current_ratio = ratio(current_assets, current_liabilities);

        let total_debt = balance.value(line_items::SHORT_TERM_DEBT).unwrap_or(0.0)
            + balance.value(line_items::LONG_TERM_DEBT).unwrap_or(0.0);
        metrics.debt_to_equity = ratio(Some(total_debt), equity);

        metrics.book_value_per_share = ratio(equity, shares);

        if let (Some(ca), Some(tl)) = (current_assets, total_liabilities) {
            metrics.ncav_per_share = ratio(Some(ca - tl), shares);
        }

        let intangibles = balance.value(line_items::INTANGIBLE_ASSETS).unwrap_or(0.0);
        let goodwill = balance.value(line_items::GOODWILL).unwrap_or(0.0);
        metrics.tangible_book_value = ratio(equity.map(|e| e - intangibles - goodwill), shares);

        if let Some(income) = income {
            let net_income = income.value(line_items::NET_INCOME);
            metrics.earnings_per_share = ratio(net_income, shares);
            metrics.roe = ratio(net_income, equity);
        }
    }

    metrics.pe_ratio = ratio(Some(current_price), metrics.earnings_per_share);
    metrics.pb_ratio = ratio(Some(current_price), metrics.book_value_per_share);

    metrics.owner_earnings = cash_flow.and_then(|cf| owner_earnings(cf, income, config));
    metrics.earnings_growth = earnings_growth(&by_kind);
    metrics.dividend_years = dividend_years(&by_kind);

    metrics
}

/// Operating cash flow less a conservative maintenance-capex estimate.
///
/// Capex wins over depreciation, which wins over a flat 20% haircut. A capex
/// or depreciation figure of exactly zero counts as unreported.
fn owner_earnings(
    cash_flow: &StatementRecord,
    income: Option<&StatementRecord>,
    config: &ValuationConfig,
) -> Option<f64> {
    let operating_cf = cash_flow.value(line_items::OPERATING_CASHFLOW)?;

    let capex = cash_flow
        .value(line_items::CAPITAL_EXPENDITURES)
        .filter(|c| *c != 0.0);
    let depreciation = income
        .and_then(|i| i.value(line_items::DEPRECIATION_AND_AMORTIZATION))
        .or_else(|| cash_flow.value(line_items::DEPRECIATION_DEPLETION_AND_AMORTIZATION))
        .filter(|d| *d != 0.0);

    let owner_earnings = match (capex, depreciation) {
        (Some(capex), _) => operating_cf - capex.abs() * config.capex_multiplier,
        (None, Some(depreciation)) => operating_cf - depreciation * config.depreciation_conservatism,
        (None, None) => operating_cf * FLAT_MAINTENANCE_RETENTION,
    };

    (owner_earnings > 0.0).then_some(owner_earnings)
}

/// Net income CAGR over every income statement, oldest to newest.
///
/// Absent with fewer than three years or if any year is missing or not positive.
fn earnings_growth(by_kind: &ByKind<'_>) -> Option<f64> {
    let income = by_kind.get(&StatementKind::Income)?;
    if income.len() < MIN_GROWTH_YEARS {
        return None;
    }

    let earnings = income
        .values()
        .map(|stmt| stmt.value(line_items::NET_INCOME).filter(|ni| *ni > 0.0))
        .collect::<Option<Vec<_>>>()?;

    let (first, last) = (earnings.first()?, earnings.last()?);
    let span = (earnings.len() - 1) as f64;
    Some((last / first).powf(1.0 / span) - 1.0)
}

fn dividend_years(by_kind: &ByKind<'_>) -> u32 {
    by_kind
        .get(&StatementKind::CashFlow)
        .map_or(0, |years| {
            years
                .values()
                .filter(|stmt| {
                    stmt.value(line_items::DIVIDENDS_PAID)
                        .is_some_and(|d| d < 0.0)
                })
                .count() as u32
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile() -> CompanyProfile {
        CompanyProfile::new("TEST", "Test Co", "Industrials", "Machinery")
    }

    fn income(year: i32, net_income: &str) -> StatementRecord {
        StatementRecord::new("TEST", year, StatementKind::Income)
            .with_field(line_items::NET_INCOME, net_income)
    }

    fn extract_default(statements: &[StatementRecord], price: f64) -> MetricsSnapshot {
        extract(statements, &profile(), price, &ValuationConfig::default())
    }

    #[test]
    fn test_empty_statements_yield_ticker_only() {
        let metrics = extract_default(&[], 20.0);
        assert_eq!(metrics, MetricsSnapshot::empty("TEST"));
    }

    #[test]
    fn test_ratios_absent_for_non_positive_denominators() {
        let balance = StatementRecord::new("TEST", 2023, StatementKind::Balance)
            .with_field(line_items::TOTAL_CURRENT_ASSETS, "500")
            .with_field(line_items::TOTAL_CURRENT_LIABILITIES, "0")
            .with_field(line_items::TOTAL_LIABILITIES, "400")
            .with_field(line_items::TOTAL_SHAREHOLDER_EQUITY, "-100")
            .with_field(line_items::SHARES_OUTSTANDING, "0");
        let metrics = extract_default(&[balance, income(2023, "100")], 20.0);

        assert_eq!(metrics.current_ratio, None);
        assert_eq!(metrics.debt_to_equity, None);
        assert_eq!(metrics.book_value_per_share, None);
        assert_eq!(metrics.ncav_per_share, None);
        assert_eq!(metrics.tangible_book_value, None);
        assert_eq!(metrics.earnings_per_share, None);
        assert_eq!(metrics.pe_ratio, None);
        assert_eq!(metrics.pb_ratio, None);
        assert_eq!(metrics.roe, None);
    }

    #[test]
    fn test_ncav_negative_when_liabilities_exceed_current_assets() {
        let balance = StatementRecord::new("TEST", 2023, StatementKind::Balance)
            .with_field(line_items::TOTAL_CURRENT_ASSETS, "300")
            .with_field(line_items::TOTAL_LIABILITIES, "800")
            .with_field(line_items::SHARES_OUTSTANDING, "100");
        let metrics = extract_default(&[balance], 20.0);
        assert_relative_eq!(metrics.ncav_per_share.unwrap(), -5.0);
    }

    #[test]
    fn test_missing_debt_counts_as_zero() {
        let balance = StatementRecord::new("TEST", 2023, StatementKind::Balance)
            .with_field(line_items::TOTAL_SHAREHOLDER_EQUITY, "800");
        let metrics = extract_default(&[balance], 20.0);
        assert_eq!(metrics.debt_to_equity, Some(0.0));
    }

    #[test]
    fn test_negative_eps_has_no_pe() {
        let balance = StatementRecord::new("TEST", 2023, StatementKind::Balance)
            .with_field(line_items::SHARES_OUTSTANDING, "10");
        let metrics = extract_default(&[balance, income(2023, "-50")], 20.0);
        assert_eq!(metrics.earnings_per_share, Some(-5.0));
        assert_eq!(metrics.pe_ratio, None);
    }

    #[test]
    fn test_only_latest_year_drives_ratios() {
        let old = StatementRecord::new("TEST", 2021, StatementKind::Balance)
            .with_field(line_items::TOTAL_CURRENT_ASSETS, "900")
            .with_field(line_items::TOTAL_CURRENT_LIABILITIES, "100");
        let new = StatementRecord::new("TEST", 2023, StatementKind::Balance)
            .with_field(line_items::TOTAL_CURRENT_ASSETS, "300")
            .with_field(line_items::TOTAL_CURRENT_LIABILITIES, "200");
        let metrics = extract_default(&[new, old], 20.0);
        assert_relative_eq!(metrics.current_ratio.unwrap(), 1.5);
    }

    #[test]
    fn test_owner_earnings_capex_priority() {
        let cf = StatementRecord::new("TEST", 2023, StatementKind::CashFlow)
            .with_field(line_items::OPERATING_CASHFLOW, "120000000")
            .with_field(line_items::CAPITAL_EXPENDITURES, "-30000000");
        let inc = income(2023, "100000000")
            .with_field(line_items::DEPRECIATION_AND_AMORTIZATION, "20000000");
        let metrics = extract_default(&[cf, inc], 20.0);
        assert_eq!(metrics.owner_earnings, Some(84_000_000.0));
    }

    #[test]
    fn test_owner_earnings_depreciation_fallback() {
        let cf = StatementRecord::new("TEST", 2023, StatementKind::CashFlow)
            .with_field(line_items::OPERATING_CASHFLOW, "100")
            .with_field(line_items::CAPITAL_EXPENDITURES, "None");
        let inc = income(2023, "50").with_field(line_items::DEPRECIATION_AND_AMORTIZATION, "20");
        let metrics = extract_default(&[cf, inc], 20.0);
        assert_relative_eq!(metrics.owner_earnings.unwrap(), 78.0);
    }

    #[test]
    fn test_owner_earnings_flat_haircut() {
        let cf = StatementRecord::new("TEST", 2023, StatementKind::CashFlow)
            .with_field(line_items::OPERATING_CASHFLOW, "100");
        let metrics = extract_default(&[cf], 20.0);
        assert_relative_eq!(metrics.owner_earnings.unwrap(), 80.0);
    }

    #[test]
    fn test_owner_earnings_absent_when_not_positive() {
        let cf = StatementRecord::new("TEST", 2023, StatementKind::CashFlow)
            .with_field(line_items::OPERATING_CASHFLOW, "10")
            .with_field(line_items::CAPITAL_EXPENDITURES, "-50");
        let metrics = extract_default(&[cf], 20.0);
        assert_eq!(metrics.owner_earnings, None);

        let no_ocf = StatementRecord::new("TEST", 2023, StatementKind::CashFlow);
        assert_eq!(extract_default(&[no_ocf], 20.0).owner_earnings, None);
    }

    #[test]
    fn test_earnings_growth_cagr() {
        let statements = vec![
            income(2021, "82644628"),
            income(2022, "90909091"),
            income(2023, "100000000"),
        ];
        let metrics = extract_default(&statements, 20.0);
        assert_relative_eq!(metrics.earnings_growth.unwrap(), 0.10, epsilon = 1e-6);
    }

    #[test]
    fn test_earnings_growth_needs_three_years() {
        let statements = vec![income(2022, "90"), income(2023, "100")];
        assert_eq!(extract_default(&statements, 20.0).earnings_growth, None);
    }

    #[test]
    fn test_single_bad_year_invalidates_growth() {
        let valid = vec![income(2020, "80"), income(2021, "90"), income(2023, "100")];
        assert!(extract_default(&valid, 20.0).earnings_growth.is_some());

        for bad in ["0", "-10", "None"] {
            let mut statements = valid.clone();
            statements.push(income(2022, bad));
            assert_eq!(extract_default(&statements, 20.0).earnings_growth, None);
        }
    }

    #[test]
    fn test_flat_earnings_growth_is_zero_not_absent() {
        let statements = vec![income(2021, "100"), income(2022, "100"), income(2023, "100")];
        assert_eq!(extract_default(&statements, 20.0).earnings_growth, Some(0.0));
    }

    #[test]
    fn test_dividend_years_counts_outflows() {
        let cf = |year, dividends: &str| {
            StatementRecord::new("TEST", year, StatementKind::CashFlow)
                .with_field(line_items::DIVIDENDS_PAID, dividends)
        };
        let statements = vec![cf(2020, "-10"), cf(2021, "0"), cf(2022, "5"), cf(2023, "-12")];
        assert_eq!(extract_default(&statements, 20.0).dividend_years, 2);
    }

    #[test]
    fn test_duplicate_year_later_record_wins() {
        let first = StatementRecord::new("TEST", 2023, StatementKind::Balance)
            .with_field(line_items::TOTAL_CURRENT_ASSETS, "100")
            .with_field(line_items::TOTAL_CURRENT_LIABILITIES, "100");
        let second = StatementRecord::new("TEST", 2023, StatementKind::Balance)
            .with_field(line_items::TOTAL_CURRENT_ASSETS, "300")
            .with_field(line_items::TOTAL_CURRENT_LIABILITIES, "100");
        let metrics = extract_default(&[first, second], 20.0);
        assert_eq!(metrics.current_ratio, Some(3.0));
    }
}
