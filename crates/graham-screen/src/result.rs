//! Per-ticker screening result.

use crate::score::{ScoreBreakdown, score};
use derive_more::Display;
use graham_valuation::{
    CompanyProfile, MetricsSnapshot, StatementRecord, ValuationEstimate, Valuator, triangulate,
};
use serde::{Deserialize, Serialize};

/// A valued candidate.
///
/// `rank` stays 0 until [`rank`](crate::rank::rank) assigns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenResult {
    /// Ticker symbol
    pub ticker: String,
    /// Company display name
    pub company_name: String,
    /// Sector
    pub sector: String,
    /// Price used for every margin of safety
    pub current_price: f64,
    /// Triangulated per-share intrinsic value
    pub intrinsic_value: f64,
    /// `(intrinsic_value - current_price) / intrinsic_value`
    pub margin_of_safety: f64,
    /// Estimates behind the triangulated value, EPV first
    pub valuations: Vec<ValuationEstimate>,
    /// Metrics snapshot
    pub metrics: MetricsSnapshot,
    /// Composite score, 0 to 100
    pub graham_score: f64,
    /// 1-based rank, 0 when unranked
    pub rank: usize,
}

impl ScreenResult {
    /// Per-bucket composition of `graham_score`.
    pub fn score_breakdown(&self) -> ScoreBreakdown {
        score(&self.metrics, self.margin_of_safety)
    }

    /// Investment thesis band for the overall margin of safety.
    pub fn thesis(&self) -> InvestmentThesis {
        InvestmentThesis::from_margin(self.margin_of_safety)
    }
}

/// Why a ticker produced no [`ScreenResult`].
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Price missing, zero or negative
    #[display("no positive price")]
    NoPrice,
    /// No method produced an estimate
    #[display("no valuation could be computed")]
    NoEstimates,
    /// The triangulated value is not positive
    #[display("triangulated value is not positive")]
    NonPositiveValue,
}

/// Value a ticker and wrap it as a [`ScreenResult`].
///
/// The margin of safety is measured against the triangulated value. Tickers
/// with no usable price, no estimates or a non-positive triangulated value are
/// skipped.
pub fn evaluate(
    profile: &CompanyProfile,
    statements: &[StatementRecord],
    current_price: f64,
    valuator: &Valuator,
) -> Result<ScreenResult, SkipReason> {
    if !(current_price.is_finite() && current_price > 0.0) {
        return Err(SkipReason::NoPrice);
    }

    let (valuations, metrics) = valuator.value_all(statements, profile, current_price);
    let intrinsic_value = triangulate(&valuations).ok_or(SkipReason::NoEstimates)?;
    if intrinsic_value <= 0.0 {
        return Err(SkipReason::NonPositiveValue);
    }

    let margin_of_safety = (intrinsic_value - current_price) / intrinsic_value;
    let graham_score = score(&metrics, margin_of_safety).total();

    Ok(ScreenResult {
        ticker: profile.ticker.clone(),
        company_name: profile.name.clone(),
        sector: profile.sector.clone(),
        current_price,
        intrinsic_value,
        margin_of_safety,
        valuations,
        metrics,
        graham_score,
        rank: 0,
    })
}

/// Qualitative reading of the overall margin of safety.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvestmentThesis {
    /// Margin of safety of 50% or more
    #[display("Strong Value Opportunity")]
    StrongValue,
    /// Margin of safety of 30% or more
    #[display("Moderate Value Opportunity")]
    ModerateValue,
    /// Anything thinner
    #[display("Speculative")]
    Speculative,
}

impl InvestmentThesis {
    /// Band for a margin of safety.
    pub fn from_margin(margin_of_safety: f64) -> Self {
        if margin_of_safety >= 0.5 {
            Self::StrongValue
        } else if margin_of_safety >= 0.3 {
            Self::ModerateValue
        } else {
            Self::Speculative
        }
    }

    /// One-line explanation shown under the thesis.
    pub const fn explanation(self) -> &'static str {
        match self {
            Self::StrongValue => {
                "Meets Benjamin Graham's conservative criteria with substantial margin of safety."
            }
            Self::ModerateValue => "Decent margin of safety but requires careful analysis.",
            Self::Speculative => {
                "Limited margin of safety, high risk relative to Graham's principles."
            }
        }
    }
}
