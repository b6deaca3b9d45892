//! Graham's hard filters.
//!
//! Every check runs; failures are collected so a rejected candidate carries
//! the full list of reasons.

use crate::{
    criteria::{GrahamCriteria, MAX_PE_TIMES_PB},
    result::ScreenResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// A violated Graham rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterFailure {
    /// Current ratio missing or below the minimum
    CurrentRatio {
        /// Observed value
        actual: Option<f64>,
        /// Required minimum
        min: f64,
    },
    /// Debt to equity above the maximum
    DebtToEquity {
        /// Observed value
        actual: f64,
        /// Allowed maximum
        max: f64,
    },
    /// Earnings growth missing or negative
    EarningsGrowth,
    /// P/E above the maximum
    PeRatio {
        /// Observed value
        actual: f64,
        /// Allowed maximum
        max: f64,
    },
    /// P/B above the maximum
    PbRatio {
        /// Observed value
        actual: f64,
        /// Allowed maximum
        max: f64,
    },
    /// P/E times P/B above [`MAX_PE_TIMES_PB`]
    PeTimesPb {
        /// Observed product
        product: f64,
    },
    /// Overall margin of safety below the minimum
    MarginOfSafety {
        /// Observed value
        actual: f64,
        /// Required minimum
        min: f64,
    },
    /// Book value per share missing, zero or negative
    BookValue,
}

impl fmt::Display for FilterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CurrentRatio {
                actual: Some(actual),
                min,
            } => write!(f, "Current ratio {actual:.2} < {min:.2}"),
            Self::CurrentRatio { actual: None, min } => {
                write!(f, "Current ratio N/A < {min:.2}")
            }
            Self::DebtToEquity { actual, max } => write!(f, "Debt/equity {actual:.2} > {max:.2}"),
            Self::EarningsGrowth => f.write_str("Inconsistent or negative earnings growth"),
            Self::PeRatio { actual, max } => write!(f, "PE ratio {actual:.2} > {max:.2}"),
            Self::PbRatio { actual, max } => write!(f, "PB ratio {actual:.2} > {max:.2}"),
            Self::PeTimesPb { product } => {
                write!(f, "PE x PB {product:.1} > {MAX_PE_TIMES_PB:.1}")
            }
            Self::MarginOfSafety { actual, min } => write!(
                f,
                "Margin of safety {:.1}% < {:.1}%",
                actual * 100.0,
                min * 100.0
            ),
            Self::BookValue => f.write_str("Negative or zero book value"),
        }
    }
}

/// Result of running the filters on one candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    /// Every rule the candidate violated, in rule order
    pub failures: Vec<FilterFailure>,
}

impl FilterOutcome {
    /// True when no rule was violated.
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable reasons, in rule order.
    pub fn reasons(&self) -> Vec<String> {
        self.failures.iter().map(ToString::to_string).collect()
    }
}

/// Run all eight filters against a candidate.
pub fn check(result: &ScreenResult, criteria: &GrahamCriteria) -> FilterOutcome {
    let metrics = &result.metrics;
    let mut failures = Vec::new();

    if metrics
        .current_ratio
        .is_none_or(|cr| cr < criteria.min_current_ratio)
    {
        failures.push(FilterFailure::CurrentRatio {
            actual: metrics.current_ratio,
            min: criteria.min_current_ratio,
        });
    }

    if let Some(de) = metrics
        .debt_to_equity
        .filter(|de| *de > criteria.max_debt_to_equity)
    {
        failures.push(FilterFailure::DebtToEquity {
            actual: de,
            max: criteria.max_debt_to_equity,
        });
    }

    if metrics.earnings_growth.is_none_or(|g| g < 0.0) {
        failures.push(FilterFailure::EarningsGrowth);
    }

    if let Some(pe) = metrics.pe_ratio.filter(|pe| *pe > criteria.max_pe_ratio) {
        failures.push(FilterFailure::PeRatio {
            actual: pe,
            max: criteria.max_pe_ratio,
        });
    }

    if let Some(pb) = metrics.pb_ratio.filter(|pb| *pb > criteria.max_pb_ratio) {
        failures.push(FilterFailure::PbRatio {
            actual: pb,
            max: criteria.max_pb_ratio,
        });
    }

    if let (Some(pe), Some(pb)) = (metrics.pe_ratio, metrics.pb_ratio) {
        let product = pe * pb;
        if product > MAX_PE_TIMES_PB {
            failures.push(FilterFailure::PeTimesPb { product });
        }
    }

    if result.margin_of_safety < criteria.min_margin_of_safety {
        failures.push(FilterFailure::MarginOfSafety {
            actual: result.margin_of_safety,
            min: criteria.min_margin_of_safety,
        });
    }

    if metrics.book_value_per_share.is_none_or(|bv| bv <= 0.0) {
        failures.push(FilterFailure::BookValue);
    }

    FilterOutcome { failures }
}

/// A candidate that failed at least one filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// Ticker symbol
    pub ticker: String,
    /// Composite score the candidate still earned
    pub graham_score: f64,
    /// Rules violated
    pub outcome: FilterOutcome,
}

/// Split candidates into those that pass every filter and rejections.
///
/// Input order is preserved on both sides.
pub fn apply_filters(
    results: Vec<ScreenResult>,
    criteria: &GrahamCriteria,
) -> (Vec<ScreenResult>, Vec<Rejection>) {
    let analyzed = results.len();
    let mut qualified = Vec::new();
    let mut rejected = Vec::new();

    for result in results {
        let outcome = check(&result, criteria);
        if outcome.passed() {
            debug!(ticker = %result.ticker, "passed all Graham filters");
            qualified.push(result);
        } else {
            debug!(
                ticker = %result.ticker,
                reasons = %outcome.reasons().join("; "),
                "failed Graham filters"
            );
            rejected.push(Rejection {
                ticker: result.ticker,
                graham_score: result.graham_score,
                outcome,
            });
        }
    }

    info!(
        "{} stocks passed Graham filters out of {} analyzed",
        qualified.len(),
        analyzed
    );
    (qualified, rejected)
}
