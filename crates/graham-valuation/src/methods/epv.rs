//! Earnings Power Value.
//!
//! Capitalizes owner earnings per share at a fixed 10% with no growth.

use super::{ValuationModel, first_reported_shares, format_dollars};
use crate::{
    config::ValuationConfig,
    estimate::{Confidence, ValuationEstimate, ValuationMethod, margin_of_safety},
    metrics::MetricsSnapshot,
    statement::StatementRecord,
};

/// Discount rate used to capitalize owner earnings.
pub const EPV_DISCOUNT_RATE: f64 = 0.10;

const MIN_MARGIN: f64 = 0.30;
const MIN_CURRENT_RATIO: f64 = 2.0;

/// Earnings Power Value estimator.
#[derive(Debug, Clone, Default)]
pub struct EarningsPowerValue {
    config: ValuationConfig,
}

impl EarningsPowerValue {
    /// Create with a valuation configuration (used for the reported capex multiplier).
    pub const fn with_config(config: ValuationConfig) -> Self {
        Self { config }
    }
}

impl ValuationModel for EarningsPowerValue {
    fn method(&self) -> ValuationMethod {
        ValuationMethod::EarningsPower
    }

    fn estimate(
        &self,
        statements: &[StatementRecord],
        current_price: f64,
        metrics: &MetricsSnapshot,
    ) -> Option<ValuationEstimate> {
        let owner_earnings = metrics.owner_earnings?;
        metrics.book_value_per_share?;
        let shares = first_reported_shares(statements)?;

        let intrinsic_value = owner_earnings / shares / EPV_DISCOUNT_RATE;
        let margin = margin_of_safety(intrinsic_value, current_price);

        let assumptions = vec![
            "10% discount rate used".to_string(),
            "No growth assumed (conservative)".to_string(),
            format!("Owner earnings: {}", format_dollars(owner_earnings)),
            format!("Capex multiplier: {}", self.config.capex_multiplier),
        ];

        let mut warnings = Vec::new();
        let mut confidence = Confidence::High;

        if margin < MIN_MARGIN {
            warnings.push("Margin of safety below 30%".to_string());
            confidence = confidence.downgrade_to(Confidence::Medium);
        }
        if metrics.current_ratio.is_none_or(|cr| cr < MIN_CURRENT_RATIO) {
            warnings.push("Current ratio below 2.0".to_string());
            confidence = confidence.downgrade_to(Confidence::Medium);
        }

        Some(ValuationEstimate {
            method: self.method(),
            intrinsic_value,
            current_price,
            margin_of_safety: margin,
            confidence,
            assumptions,
            warnings,
        })
    }
}
