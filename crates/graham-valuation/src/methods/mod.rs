//! Intrinsic-value estimators.
//!
//! Each method consumes the raw statements, the current price and a metrics
//! snapshot, and returns `None` when it cannot produce an estimate.

pub mod asset;
pub mod dcf;
pub mod epv;

pub use asset::AssetBased;
pub use dcf::ConservativeDcf;
pub use epv::EarningsPowerValue;

use crate::{
    estimate::{ValuationEstimate, ValuationMethod},
    metrics::MetricsSnapshot,
    statement::{StatementKind, StatementRecord, line_items},
};
use std::fmt::Debug;

/// A single intrinsic-value estimation method.
pub trait ValuationModel: Debug + Send + Sync {
    /// Which method this is.
    fn method(&self) -> ValuationMethod;

    /// Estimate per-share intrinsic value, or `None` if inputs are insufficient.
    fn estimate(
        &self,
        statements: &[StatementRecord],
        current_price: f64,
        metrics: &MetricsSnapshot,
    ) -> Option<ValuationEstimate>;
}

/// Shares outstanding from the first balance statement, in input order, that reports a positive count.
pub(crate) fn first_reported_shares(statements: &[StatementRecord]) -> Option<f64> {
    statements
        .iter()
        .filter(|stmt| stmt.kind == StatementKind::Balance)
        .find_map(|stmt| stmt.value(line_items::SHARES_OUTSTANDING).filter(|s| *s > 0.0))
}

/// Format a dollar amount rounded to whole units with thousands separators.
pub(crate) fn format_dollars(amount: f64) -> String {
    let rounded = format!("{:.0}", amount.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (i, ch) in rounded.chars().enumerate() {
        if i > 0 && (rounded.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0.0 && rounded != "0" {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Format a fraction as a percentage with one decimal.
pub(crate) fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(84_000_000.0), "$84,000,000");
        assert_eq!(format_dollars(999.4), "$999");
        assert_eq!(format_dollars(1000.0), "$1,000");
        assert_eq!(format_dollars(-1234.0), "-$1,234");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.05), "5.0%");
        assert_eq!(format_percent(0.025), "2.5%");
    }

    #[test]
    fn test_first_reported_shares_is_input_order() {
        let statements = vec![
            StatementRecord::new("T", 2021, StatementKind::Income)
                .with_field(line_items::SHARES_OUTSTANDING, "1"),
            StatementRecord::new("T", 2021, StatementKind::Balance)
                .with_field(line_items::SHARES_OUTSTANDING, "None"),
            StatementRecord::new("T", 2021, StatementKind::Balance)
                .with_field(line_items::SHARES_OUTSTANDING, "40"),
            StatementRecord::new("T", 2023, StatementKind::Balance)
                .with_field(line_items::SHARES_OUTSTANDING, "50"),
        ];
        assert_eq!(first_reported_shares(&statements), Some(40.0));
    }
}
