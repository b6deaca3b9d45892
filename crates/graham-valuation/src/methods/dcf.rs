//! Conservative discounted cash flow.
//!
//! Projects owner earnings ten years forward at a capped growth rate, adds a
//! Gordon growth terminal value, and discounts everything at 12%.

use super::{ValuationModel, first_reported_shares, format_percent};
use crate::{
    estimate::{Confidence, ValuationEstimate, ValuationMethod, margin_of_safety},
    metrics::MetricsSnapshot,
    statement::StatementRecord,
};

/// Cap on projected growth.
pub const MAX_GROWTH_RATE: f64 = 0.05;
/// Cap on terminal growth.
pub const MAX_TERMINAL_GROWTH: f64 = 0.02;
/// Discount rate for projected earnings.
pub const DCF_DISCOUNT_RATE: f64 = 0.12;
/// Length of the explicit projection.
pub const PROJECTION_YEARS: i32 = 10;

const HIGH_GROWTH_WARNING: f64 = 0.03;
const MIN_MARGIN: f64 = 0.50;

/// Conservative DCF estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConservativeDcf;

impl ConservativeDcf {
    /// Total present value of `owner_earnings` grown at `growth_rate`.
    pub fn present_value(owner_earnings: f64, growth_rate: f64, terminal_growth: f64) -> f64 {
        let explicit: f64 = (1..=PROJECTION_YEARS)
            .map(|year| {
                owner_earnings * (1.0 + growth_rate).powi(year)
                    / (1.0 + DCF_DISCOUNT_RATE).powi(year)
            })
            .sum();

        let terminal_earnings = owner_earnings * (1.0 + growth_rate).powi(PROJECTION_YEARS);
        let terminal_value =
            terminal_earnings * (1.0 + terminal_growth) / (DCF_DISCOUNT_RATE - terminal_growth);
        let terminal_pv = terminal_value / (1.0 + DCF_DISCOUNT_RATE).powi(PROJECTION_YEARS);

        explicit + terminal_pv
    }
}

impl ValuationModel for ConservativeDcf {
    fn method(&self) -> ValuationMethod {
        ValuationMethod::ConservativeDcf
    }

    fn estimate(
        &self,
        statements: &[StatementRecord],
        current_price: f64,
        metrics: &MetricsSnapshot,
    ) -> Option<ValuationEstimate> {
        let owner_earnings = metrics.owner_earnings?;
        let earnings_growth = metrics.earnings_growth?;

        let growth_rate = earnings_growth.clamp(0.0, MAX_GROWTH_RATE);
        let terminal_growth = (growth_rate * 0.5).min(MAX_TERMINAL_GROWTH);

        let assumptions = vec![
            format!("Growth rate: {} (capped at 5%)", format_percent(growth_rate)),
            format!("Terminal growth: {}", format_percent(terminal_growth)),
            format!("Discount rate: {}", format_percent(DCF_DISCOUNT_RATE)),
            "10-year projection period".to_string(),
        ];

        let shares = first_reported_shares(statements)?;
        let intrinsic_value =
            Self::present_value(owner_earnings, growth_rate, terminal_growth) / shares;
        let margin = margin_of_safety(intrinsic_value, current_price);

        let mut warnings = Vec::new();
        if growth_rate > HIGH_GROWTH_WARNING {
            warnings.push("Growth rate above 3% increases uncertainty".to_string());
        }
        if margin < MIN_MARGIN {
            warnings.push("Graham requires large margin for growth assumptions".to_string());
        }

        Some(ValuationEstimate {
            method: self.method(),
            intrinsic_value,
            current_price,
            margin_of_safety: margin,
            confidence: Confidence::Low,
            assumptions,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{StatementKind, line_items};
    use approx::assert_relative_eq;

    fn statements() -> Vec<StatementRecord> {
        vec![
            StatementRecord::new("T", 2023, StatementKind::Balance)
                .with_field(line_items::SHARES_OUTSTANDING, "1"),
        ]
    }

    fn metrics(growth: f64) -> MetricsSnapshot {
        MetricsSnapshot {
            owner_earnings: Some(100.0),
            earnings_growth: Some(growth),
            ..MetricsSnapshot::empty("T")
        }
    }

    #[test]
    fn test_zero_growth_matches_closed_form() {
        let est = ConservativeDcf.estimate(&statements(), 1.0, &metrics(-0.2)).unwrap();

        // Annuity factor for 10 years at 12%, plus perpetuity 100/0.12 discounted 10 years.
        let annuity = (1.0 - 1.12_f64.powi(-10)) / 0.12 * 100.0;
        let perpetuity = 100.0 / 0.12 / 1.12_f64.powi(10);
        assert_relative_eq!(est.intrinsic_value, annuity + perpetuity, epsilon = 1e-9);
        assert_relative_eq!(est.intrinsic_value, 100.0 / 0.12, epsilon = 1e-9);
        assert_eq!(est.assumptions[0], "Growth rate: 0.0% (capped at 5%)");
    }

    #[test]
    fn test_growth_is_capped() {
        let capped = ConservativeDcf.estimate(&statements(), 1.0, &metrics(0.25)).unwrap();
        let at_cap = ConservativeDcf.estimate(&statements(), 1.0, &metrics(0.05)).unwrap();

        assert_relative_eq!(capped.intrinsic_value, at_cap.intrinsic_value);
        assert_eq!(capped.assumptions[0], "Growth rate: 5.0% (capped at 5%)");
        assert_eq!(capped.assumptions[1], "Terminal growth: 2.0%");
        assert_eq!(capped.assumptions[2], "Discount rate: 12.0%");
        assert_eq!(capped.confidence, Confidence::Low);
        assert!(
            capped
                .warnings
                .contains(&"Growth rate above 3% increases uncertainty".to_string())
        );
    }

    #[test]
    fn test_margin_warning() {
        let est = ConservativeDcf.estimate(&statements(), 10_000.0, &metrics(0.02)).unwrap();
        assert_eq!(est.warnings, vec!["Graham requires large margin for growth assumptions"]);
        assert!(est.margin_of_safety < 0.0);
    }

    #[test]
    fn test_requires_growth_and_shares() {
        let no_growth = MetricsSnapshot {
            earnings_growth: None,
            ..metrics(0.05)
        };
        assert!(ConservativeDcf.estimate(&statements(), 1.0, &no_growth).is_none());
        assert!(ConservativeDcf.estimate(&[], 1.0, &metrics(0.05)).is_none());
    }
}
