//! Confidence-weighted combination of estimates.

use crate::estimate::ValuationEstimate;

/// Weighted mean of intrinsic values using [`Confidence::weight`](crate::Confidence::weight).
///
/// Returns `None` for an empty slice.
pub fn triangulate(estimates: &[ValuationEstimate]) -> Option<f64> {
    let (weighted_sum, total_weight) =
        estimates
            .iter()
            .fold((0.0, 0.0), |(sum, total), estimate| {
                let weight = estimate.confidence.weight();
                (sum + estimate.intrinsic_value * weight, total + weight)
            });

    (total_weight > 0.0).then(|| weighted_sum / total_weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::{Confidence, ValuationMethod};
    use approx::assert_relative_eq;

    fn estimate(value: f64, confidence: Confidence) -> ValuationEstimate {
        ValuationEstimate {
            method: ValuationMethod::EarningsPower,
            intrinsic_value: value,
            current_price: 20.0,
            margin_of_safety: 0.0,
            confidence,
            assumptions: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn test_weighted_mean() {
        let estimates = vec![
            estimate(16.80, Confidence::High),
            estimate(2.00, Confidence::Medium),
            estimate(25.00, Confidence::Low),
        ];
        assert_relative_eq!(triangulate(&estimates).unwrap(), 13.233, epsilon = 0.01);
    }

    #[test]
    fn test_order_independent() {
        let mut estimates = vec![
            estimate(16.80, Confidence::High),
            estimate(2.00, Confidence::Medium),
            estimate(25.00, Confidence::Low),
        ];
        let forward = triangulate(&estimates).unwrap();
        estimates.reverse();
        assert_relative_eq!(triangulate(&estimates).unwrap(), forward, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_is_absent() {
        assert_eq!(triangulate(&[]), None);
    }

    #[test]
    fn test_single_estimate() {
        assert_eq!(triangulate(&[estimate(7.5, Confidence::Low)]), Some(7.5));
    }
}
