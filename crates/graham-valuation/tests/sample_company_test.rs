//! End-to-end valuation of a three-year sample company.

use approx::assert_relative_eq;
use graham_valuation::{
    CompanyProfile, Confidence, StatementKind, StatementRecord, ValuationConfig, ValuationMethod,
    Valuator, line_items, triangulate,
};

fn sample_statements() -> Vec<StatementRecord> {
    let mut statements = Vec::new();
    for year in 2021..=2023 {
        statements.push(
            StatementRecord::new("TEST", year, StatementKind::Income)
                .with_field(line_items::NET_INCOME, "100000000")
                .with_field(line_items::DEPRECIATION_AND_AMORTIZATION, "20000000"),
        );
        statements.push(
            StatementRecord::new("TEST", year, StatementKind::Balance)
                .with_field(line_items::TOTAL_CURRENT_ASSETS, "500000000")
                .with_field(line_items::TOTAL_CURRENT_LIABILITIES, "200000000")
                .with_field(line_items::TOTAL_STOCKHOLDER_EQUITY, "800000000")
                .with_field(line_items::SHORT_TERM_DEBT, "50000000")
                .with_field(line_items::LONG_TERM_DEBT, "150000000")
                .with_field(line_items::SHARES_OUTSTANDING, "50000000")
                .with_field(line_items::INTANGIBLE_ASSETS, "100000000")
                .with_field(line_items::GOODWILL, "50000000")
                .with_field(line_items::TOTAL_LIABILITIES, "400000000"),
        );
        statements.push(
            StatementRecord::new("TEST", year, StatementKind::CashFlow)
                .with_field(line_items::OPERATING_CASHFLOW, "120000000")
                .with_field(line_items::CAPITAL_EXPENDITURES, "-30000000")
                .with_field(line_items::DIVIDENDS_PAID, "-20000000"),
        );
    }
    statements
}

fn profile() -> CompanyProfile {
    CompanyProfile::new("TEST", "Test Company", "Technology", "Software")
        .with_market_cap(1_000_000_000.0)
}

#[test]
fn test_metrics_for_sample_company() {
    let valuator = Valuator::new(ValuationConfig::default());
    let (_, metrics) = valuator.value_all(&sample_statements(), &profile(), 20.0);

    assert_relative_eq!(metrics.current_ratio.unwrap(), 2.5);
    assert_relative_eq!(metrics.debt_to_equity.unwrap(), 0.25);
    assert_relative_eq!(metrics.book_value_per_share.unwrap(), 16.0);
    assert_relative_eq!(metrics.earnings_per_share.unwrap(), 2.0);
    assert_relative_eq!(metrics.pe_ratio.unwrap(), 10.0);
    assert_relative_eq!(metrics.pb_ratio.unwrap(), 1.25);
    assert_relative_eq!(metrics.roe.unwrap(), 0.125);
    assert_relative_eq!(metrics.ncav_per_share.unwrap(), 2.0);
    assert_relative_eq!(metrics.tangible_book_value.unwrap(), 13.0);
    assert_eq!(metrics.owner_earnings, Some(84_000_000.0));
    assert_eq!(metrics.earnings_growth, Some(0.0));
    assert_eq!(metrics.dividend_years, 3);
}

#[test]
fn test_all_methods_in_fixed_order() {
    let valuator = Valuator::new(ValuationConfig::default());
    let (estimates, _) = valuator.value_all(&sample_statements(), &profile(), 20.0);

    let methods: Vec<_> = estimates.iter().map(|e| e.method).collect();
    assert_eq!(
        methods,
        vec![
            ValuationMethod::EarningsPower,
            ValuationMethod::AssetBased,
            ValuationMethod::ConservativeDcf
        ]
    );

    let epv = &estimates[0];
    assert_relative_eq!(epv.intrinsic_value, 16.8, epsilon = 1e-9);
    assert_eq!(epv.confidence, Confidence::Medium);

    let asset = &estimates[1];
    assert_relative_eq!(asset.intrinsic_value, 2.0);
    assert_eq!(asset.confidence, Confidence::Low);
    assert!(asset.margin_of_safety < -5.0);

    // Flat earnings give zero growth, so DCF collapses to owner earnings / 12%.
    let dcf = &estimates[2];
    assert_relative_eq!(dcf.intrinsic_value, 84_000_000.0 / 0.12 / 50_000_000.0, epsilon = 1e-9);
    assert_eq!(dcf.confidence, Confidence::Low);
}

#[test]
fn test_growing_company_dcf_exceeds_epv() {
    let mut statements = sample_statements();
    for stmt in &mut statements {
        if stmt.kind == StatementKind::Income {
            let net_income = match stmt.fiscal_year {
                2021 => "82644628",
                2022 => "90909091",
                _ => "100000000",
            };
            *stmt = stmt.clone().with_field(line_items::NET_INCOME, net_income);
        }
    }

    let valuator = Valuator::new(ValuationConfig::default());
    let (estimates, metrics) = valuator.value_all(&statements, &profile(), 20.0);

    assert_relative_eq!(metrics.earnings_growth.unwrap(), 0.10, epsilon = 1e-6);
    let epv = estimates[0].intrinsic_value;
    let dcf = estimates[2].intrinsic_value;
    assert!(dcf > epv);
    assert_eq!(estimates[2].assumptions[0], "Growth rate: 5.0% (capped at 5%)");
}

#[test]
fn test_triangulated_value_for_sample_company() {
    let valuator = Valuator::new(ValuationConfig::default());
    let (estimates, _) = valuator.value_all(&sample_statements(), &profile(), 20.0);

    // EPV 16.8 (medium), asset 2.0 (low), DCF 14.0 (low)
    let expected = (16.8 * 2.0 + 2.0 + 14.0) / 4.0;
    assert_relative_eq!(triangulate(&estimates).unwrap(), expected, epsilon = 1e-9);
}

#[test]
fn test_missing_statements_yield_no_estimates() {
    let valuator = Valuator::new(ValuationConfig::default());
    let (estimates, metrics) = valuator.value_all(&[], &profile(), 20.0);
    assert!(estimates.is_empty());
    assert_eq!(metrics.ticker, "TEST");
    assert!(triangulate(&estimates).is_none());
}
