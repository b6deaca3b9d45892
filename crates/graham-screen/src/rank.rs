//! Ordering of qualified candidates.

use crate::result::ScreenResult;

/// Sort by score, then margin of safety, both descending, and assign 1-based ranks.
///
/// The sort is stable: candidates tied on both keys keep their input order.
pub fn rank(mut results: Vec<ScreenResult>) -> Vec<ScreenResult> {
    results.sort_by(|a, b| {
        b.graham_score
            .total_cmp(&a.graham_score)
            .then_with(|| b.margin_of_safety.total_cmp(&a.margin_of_safety))
    });
    for (position, result) in results.iter_mut().enumerate() {
        result.rank = position + 1;
    }
    results
}
