//! Asset-based valuation.

use super::ValuationModel;
use crate::{
    estimate::{Confidence, ValuationEstimate, ValuationMethod, margin_of_safety},
    metrics::MetricsSnapshot,
    statement::StatementRecord,
};

/// Fraction of tangible book value kept after the haircut.
pub const TANGIBLE_BOOK_RETENTION: f64 = 0.8;

const MIN_MARGIN: f64 = 0.50;

/// Net current asset value, falling back to tangible book with a 20% haircut.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetBased;

impl ValuationModel for AssetBased {
    fn method(&self) -> ValuationMethod {
        ValuationMethod::AssetBased
    }

    fn estimate(
        &self,
        _statements: &[StatementRecord],
        current_price: f64,
        metrics: &MetricsSnapshot,
    ) -> Option<ValuationEstimate> {
        let mut warnings = Vec::new();

        let (intrinsic_value, mut confidence, assumptions) =
            if let Some(ncav) = metrics.ncav_per_share.filter(|v| *v > 0.0) {
                (
                    ncav,
                    Confidence::High,
                    vec![
                        "Using Net Current Asset Value (NCAV)".to_string(),
                        "All current assets at full value".to_string(),
                        "All liabilities at face value".to_string(),
                    ],
                )
            } else {
                let tbv = metrics.tangible_book_value.filter(|v| *v > 0.0)?;
                warnings.push("Assuming 20% haircut on tangible assets".to_string());
                (
                    tbv * TANGIBLE_BOOK_RETENTION,
                    Confidence::Medium,
                    vec![
                        "Using Tangible Book Value with 20% haircut".to_string(),
                        "Excludes goodwill and intangibles".to_string(),
                    ],
                )
            };

        let margin = margin_of_safety(intrinsic_value, current_price);
        if margin < MIN_MARGIN {
            warnings.push("Graham prefers 50%+ margin for asset plays".to_string());
            confidence = confidence.downgrade_to(Confidence::Low);
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metrics(ncav: Option<f64>, tbv: Option<f64>) -> MetricsSnapshot {
        MetricsSnapshot {
            ncav_per_share: ncav,
            tangible_book_value: tbv,
            ..MetricsSnapshot::empty("T")
        }
    }

    #[test]
    fn test_ncav_preferred() {
        let est = AssetBased.estimate(&[], 4.0, &metrics(Some(10.0), Some(13.0))).unwrap();
        assert_eq!(est.intrinsic_value, 10.0);
        assert_eq!(est.confidence, Confidence::High);
        assert!(est.warnings.is_empty());
        assert_eq!(est.assumptions.len(), 3);
    }

    #[test]
    fn test_tangible_book_fallback_with_haircut() {
        let est = AssetBased.estimate(&[], 2.0, &metrics(Some(-3.0), Some(13.0))).unwrap();
        assert_relative_eq!(est.intrinsic_value, 10.4);
        assert_eq!(est.confidence, Confidence::Medium);
        assert_eq!(est.warnings, vec!["Assuming 20% haircut on tangible assets"]);
    }

    #[test]
    fn test_thin_margin_downgrades_to_low() {
        let est = AssetBased.estimate(&[], 20.0, &metrics(Some(2.0), None)).unwrap();
        assert_eq!(est.confidence, Confidence::Low);
        assert!(est.margin_of_safety < -5.0);
        assert_eq!(est.warnings, vec!["Graham prefers 50%+ margin for asset plays"]);
    }

    #[test]
    fn test_absent_without_positive_asset_values() {
        assert!(AssetBased.estimate(&[], 20.0, &metrics(None, None)).is_none());
        assert!(AssetBased.estimate(&[], 20.0, &metrics(Some(0.0), Some(-1.0))).is_none());
    }
}
