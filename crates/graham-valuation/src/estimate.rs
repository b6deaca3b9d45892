//! Valuation estimates and confidence levels.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Confidence attached to a valuation estimate.
///
/// Variants are ordered from least to most confident so that a downgrade is
/// `confidence.min(target)`.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Low confidence
    #[display("low")]
    Low,
    /// Medium confidence
    #[display("medium")]
    Medium,
    /// High confidence
    #[display("high")]
    High,
}

impl Confidence {
    /// Triangulation weight: high=3, medium=2, low=1.
    pub const fn weight(self) -> f64 {
        match self {
            Self::High => 3.0,
            Self::Medium => 2.0,
            Self::Low => 1.0,
        }
    }

    /// Lower the confidence to at most `ceiling`. Never raises it.
    pub fn downgrade_to(self, ceiling: Self) -> Self {
        self.min(ceiling)
    }
}

/// Valuation method that produced an estimate.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationMethod {
    /// No-growth capitalization of owner earnings
    #[display("Earnings Power Value (EPV)")]
    #[serde(rename = "Earnings Power Value (EPV)")]
    EarningsPower,
    /// Net current asset value or haircut tangible book
    #[display("Asset-Based Valuation")]
    #[serde(rename = "Asset-Based Valuation")]
    AssetBased,
    /// Ten-year discounted owner earnings with a Gordon terminal value
    #[display("Conservative DCF")]
    #[serde(rename = "Conservative DCF")]
    ConservativeDcf,
}

/// An intrinsic-value estimate from a single method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationEstimate {
    /// Method that produced the estimate
    pub method: ValuationMethod,
    /// Per-share intrinsic value
    pub intrinsic_value: f64,
    /// Price the estimate was compared against
    pub current_price: f64,
    /// `(intrinsic_value - current_price) / intrinsic_value`, or -1 when the value is not positive
    pub margin_of_safety: f64,
    /// Confidence level
    pub confidence: Confidence,
    /// Assumptions behind the estimate, in order
    pub assumptions: Vec<String>,
    /// Warnings raised while estimating, in order
    pub warnings: Vec<String>,
}

/// Fractional discount of price below intrinsic value.
///
/// Returns the `-1.0` sentinel when `intrinsic_value` is not positive.
pub fn margin_of_safety(intrinsic_value: f64, current_price: f64) -> f64 {
    if intrinsic_value > 0.0 {
        (intrinsic_value - current_price) / intrinsic_value
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_downgrade_is_monotonic() {
        assert_eq!(Confidence::High.downgrade_to(Confidence::Medium), Confidence::Medium);
        assert_eq!(Confidence::Low.downgrade_to(Confidence::Medium), Confidence::Low);
        assert_eq!(
            Confidence::High.downgrade_to(Confidence::Medium).downgrade_to(Confidence::Medium),
            Confidence::Medium
        );
    }

    #[rstest]
    #[case(Confidence::High, 3.0)]
    #[case(Confidence::Medium, 2.0)]
    #[case(Confidence::Low, 1.0)]
    fn test_weights(#[case] confidence: Confidence, #[case] weight: f64) {
        assert_eq!(confidence.weight(), weight);
    }

    #[test]
    fn test_margin_of_safety() {
        assert_relative_eq!(margin_of_safety(20.0, 10.0), 0.5);
        assert_relative_eq!(margin_of_safety(10.0, 20.0), -1.0);
        assert_eq!(margin_of_safety(0.0, 20.0), -1.0);
        assert_eq!(margin_of_safety(-5.0, 20.0), -1.0);
    }

    #[test]
    fn test_method_names() {
        assert_eq!(ValuationMethod::EarningsPower.to_string(), "Earnings Power Value (EPV)");
        assert_eq!(
            serde_json::to_string(&ValuationMethod::ConservativeDcf).unwrap(),
            "\"Conservative DCF\""
        );
        assert_eq!(serde_json::to_string(&Confidence::High).unwrap(), "\"high\"");
    }
}
