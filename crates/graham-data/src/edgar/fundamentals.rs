//! Annual statements from SEC company facts.
//!
//! XBRL tags are mapped onto the same line-item names the Alpha Vantage
//! provider produces, so the valuation core sees one vocabulary.

use super::client::{CompanyFacts, FactValue};
use chrono::{Datelike, NaiveDate};
use graham_valuation::{RawValue, StatementKind, StatementRecord, line_items};
use std::collections::{BTreeMap, BTreeSet};

/// Day range a duration fact must span to count as a fiscal year.
const ANNUAL_DAYS: std::ops::RangeInclusive<i64> = 330..=400;

/// Taxonomies searched for each tag, in order.
const TAXONOMIES: [&str; 2] = ["us-gaap", "dei"];

/// Maps one line item to the XBRL tags that may carry it.
#[derive(Debug, Clone, Copy)]
struct TagMapping {
    item: &'static str,
    kind: StatementKind,
    /// Candidate tags, highest priority first
    tags: &'static [&'static str],
    /// Cash outflows reported as positive payments are stored negative
    outflow: bool,
}

const fn map(
    item: &'static str,
    kind: StatementKind,
    tags: &'static [&'static str],
) -> TagMapping {
    TagMapping {
        item,
        kind,
        tags,
        outflow: false,
    }
}

const fn outflow(
    item: &'static str,
    kind: StatementKind,
    tags: &'static [&'static str],
) -> TagMapping {
    TagMapping {
        item,
        kind,
        tags,
        outflow: true,
    }
}

const MAPPINGS: &[TagMapping] = &[
    map(line_items::TOTAL_CURRENT_ASSETS, StatementKind::Balance, &["AssetsCurrent"]),
    map(
        line_items::TOTAL_CURRENT_LIABILITIES,
        StatementKind::Balance,
        &["LiabilitiesCurrent"],
    ),
    map(line_items::TOTAL_LIABILITIES, StatementKind::Balance, &["Liabilities"]),
    map(
        line_items::TOTAL_SHAREHOLDER_EQUITY,
        StatementKind::Balance,
        &[
            "StockholdersEquity",
            "StockholdersEquityIncludingPortionAttributableToNoncontrollingInterest",
        ],
    ),
    map(
        line_items::SHORT_TERM_DEBT,
        StatementKind::Balance,
        &["ShortTermBorrowings", "LongTermDebtCurrent", "DebtCurrent"],
    ),
    map(
        line_items::LONG_TERM_DEBT,
        StatementKind::Balance,
        &["LongTermDebtNoncurrent", "LongTermDebt"],
    ),
    map(
        line_items::SHARES_OUTSTANDING,
        StatementKind::Balance,
        &["CommonStockSharesOutstanding", "EntityCommonStockSharesOutstanding"],
    ),
    map(
        line_items::INTANGIBLE_ASSETS,
        StatementKind::Balance,
        &["IntangibleAssetsNetExcludingGoodwill", "FiniteLivedIntangibleAssetsNet"],
    ),
    map(line_items::GOODWILL, StatementKind::Balance, &["Goodwill"]),
    map(
        line_items::NET_INCOME,
        StatementKind::Income,
        &["NetIncomeLoss", "ProfitLoss"],
    ),
    map(
        line_items::DEPRECIATION_AND_AMORTIZATION,
        StatementKind::Income,
        &["DepreciationAndAmortization", "DepreciationAmortizationAndAccretionNet"],
    ),
    map(
        line_items::OPERATING_CASHFLOW,
        StatementKind::CashFlow,
        &["NetCashProvidedByUsedInOperatingActivities"],
    ),
    outflow(
        line_items::CAPITAL_EXPENDITURES,
        StatementKind::CashFlow,
        &["PaymentsToAcquirePropertyPlantAndEquipment"],
    ),
    map(
        line_items::DEPRECIATION_DEPLETION_AND_AMORTIZATION,
        StatementKind::CashFlow,
        &["DepreciationDepletionAndAmortization", "Depreciation"],
    ),
    outflow(
        line_items::DIVIDENDS_PAID,
        StatementKind::CashFlow,
        &["PaymentsOfDividends", "PaymentsOfDividendsCommonStock"],
    ),
];

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// True for a full-year value reported in an annual report.
fn is_annual(value: &FactValue, kind: StatementKind) -> bool {
    let annual_form = value.form.as_deref().is_some_and(|f| f.starts_with("10-K"));
    let full_year = value.fp.as_deref() == Some("FY");
    if !annual_form || !full_year {
        return false;
    }

    match (kind, value.start.as_deref()) {
        (StatementKind::Balance, start) => start.is_none(),
        (_, Some(start)) => match (parse_date(start), parse_date(&value.end)) {
            (Some(start), Some(end)) => ANNUAL_DAYS.contains(&(end - start).num_days()),
            _ => false,
        },
        (_, None) => false,
    }
}

/// Fiscal year (year of period end) to (period end, value) for one mapping.
///
/// Within a tag, the most recently filed value wins so restatements replace
/// originals. Across tags, the first tag reporting a year wins.
fn annual_values(facts: &CompanyFacts, mapping: &TagMapping) -> BTreeMap<i32, (NaiveDate, f64)> {
    let mut found = BTreeMap::new();

    for tag in mapping.tags {
        let Some(tag_facts) = TAXONOMIES
            .iter()
            .find_map(|taxonomy| facts.facts.get(*taxonomy)?.get(*tag))
        else {
            continue;
        };

        let mut values: Vec<&FactValue> = tag_facts
            .units
            .values()
            .flatten()
            .filter(|v| is_annual(v, mapping.kind))
            .collect();
        values.sort_by(|a, b| a.filed.cmp(&b.filed));

        let mut per_year = BTreeMap::new();
        for value in values {
            if let Some(end) = parse_date(&value.end) {
                let val = if mapping.outflow {
                    -value.val.abs()
                } else {
                    value.val
                };
                per_year.insert(end.year(), (end, val));
            }
        }

        for (year, entry) in per_year {
            found.entry(year).or_insert(entry);
        }
    }

    found
}

/// Build annual statements for the `years` most recent fiscal years, newest
/// first, in income/balance/cash-flow order within a year.
pub fn annual_statements(ticker: &str, facts: &CompanyFacts, years: usize) -> Vec<StatementRecord> {
    let mut table: BTreeMap<(i32, StatementKind), StatementRecord> = BTreeMap::new();

    for mapping in MAPPINGS {
        for (year, (end, value)) in annual_values(facts, mapping) {
            let record = table
                .entry((year, mapping.kind))
                .or_insert_with(|| StatementRecord::new(ticker, year, mapping.kind));
            record.filing_date = Some(record.filing_date.map_or(end, |d| d.max(end)));
            record
                .fields
                .insert(mapping.item.to_string(), RawValue::Number(value));
        }
    }

    let kept: BTreeSet<i32> = table
        .keys()
        .map(|(year, _)| *year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .rev()
        .take(years)
        .collect();

    let mut statements: Vec<StatementRecord> = table
        .into_iter()
        .filter(|((year, _), _)| kept.contains(year))
        .map(|(_, record)| record)
        .collect();
    statements.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year).then(a.kind.cmp(&b.kind)));
    statements
}
