//! Composite Graham score.
//!
//! Six fixed-threshold buckets summed to at most 100:
//!
//! | Bucket | Points |
//! |---|---|
//! | Liquidity | 0-20 |
//! | Leverage | 0-15 |
//! | Valuation | 0-25 |
//! | Growth | 0-15 |
//! | Dividends | 0-10 |
//! | Margin of safety | 0-15 |

use derive_more::Display;
use graham_valuation::MetricsSnapshot;
use serde::{Deserialize, Serialize};

/// Upper bound on the composite score.
pub const MAX_SCORE: f64 = 100.0;

/// Points earned in each bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Current ratio strength (0-20)
    pub liquidity: u32,
    /// Debt management (0-15)
    pub leverage: u32,
    /// P/E and P/B (0-25)
    pub valuation: u32,
    /// Earnings growth (0-15)
    pub growth: u32,
    /// Dividend record (0-10)
    pub dividends: u32,
    /// Margin of safety bonus (0-15)
    pub safety_margin: u32,
}

impl ScoreBreakdown {
    /// Sum of all buckets, capped at [`MAX_SCORE`].
    pub fn total(&self) -> f64 {
        let sum = self.liquidity
            + self.leverage
            + self.valuation
            + self.growth
            + self.dividends
            + self.safety_margin;
        f64::from(sum).min(MAX_SCORE)
    }
}

/// Score a candidate. Independent of whether it passes the filters.
pub fn score(metrics: &MetricsSnapshot, margin_of_safety: f64) -> ScoreBreakdown {
    ScoreBreakdown {
        liquidity: liquidity_points(metrics.current_ratio),
        leverage: leverage_points(metrics.debt_to_equity),
        valuation: pe_points(metrics.pe_ratio) + pb_points(metrics.pb_ratio),
        growth: growth_points(metrics.earnings_growth),
        dividends: dividend_points(metrics.dividend_years),
        safety_margin: margin_points(margin_of_safety),
    }
}

fn liquidity_points(current_ratio: Option<f64>) -> u32 {
    match current_ratio {
        Some(cr) if cr >= 3.0 => 20,
        Some(cr) if cr >= 2.0 => 15,
        Some(cr) if cr >= 1.5 => 10,
        Some(cr) if cr >= 1.0 => 5,
        _ => 0,
    }
}

fn leverage_points(debt_to_equity: Option<f64>) -> u32 {
    match debt_to_equity {
        Some(de) if de <= 0.3 => 15,
        Some(de) if de <= 0.5 => 10,
        Some(de) if de <= 0.7 => 5,
        _ => 0,
    }
}

fn pe_points(pe_ratio: Option<f64>) -> u32 {
    match pe_ratio {
        Some(pe) if pe <= 10.0 => 15,
        Some(pe) if pe <= 15.0 => 10,
        Some(pe) if pe <= 20.0 => 5,
        _ => 0,
    }
}

fn pb_points(pb_ratio: Option<f64>) -> u32 {
    match pb_ratio {
        Some(pb) if pb <= 1.0 => 10,
        Some(pb) if pb <= 1.5 => 5,
        _ => 0,
    }
}

fn growth_points(earnings_growth: Option<f64>) -> u32 {
    match earnings_growth {
        Some(g) if g >= 0.10 => 15,
        Some(g) if g >= 0.05 => 10,
        Some(g) if g > 0.0 => 5,
        _ => 0,
    }
}

const fn dividend_points(dividend_years: u32) -> u32 {
    match dividend_years {
        10.. => 10,
        5.. => 5,
        _ => 0,
    }
}

fn margin_points(margin_of_safety: f64) -> u32 {
    if margin_of_safety >= 0.7 {
        15
    } else if margin_of_safety >= 0.5 {
        10
    } else if margin_of_safety >= 0.3 {
        5
    } else {
        0
    }
}

/// Qualitative reading of a composite score.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreInterpretation {
    /// 80 and above
    Excellent,
    /// 60 and above
    Good,
    /// 40 and above
    Fair,
    /// Below 40
    Poor,
}

impl ScoreInterpretation {
    /// Band for a composite score.
    pub fn from_score(graham_score: f64) -> Self {
        if graham_score >= 80.0 {
            Self::Excellent
        } else if graham_score >= 60.0 {
            Self::Good
        } else if graham_score >= 40.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }

    /// One-line explanation shown next to the band.
    pub const fn explanation(self) -> &'static str {
        match self {
            Self::Excellent => "Outstanding candidate meeting most of Graham's strict criteria",
            Self::Good => "Solid value stock with minor concerns",
            Self::Fair => "Some value characteristics but significant risks",
            Self::Poor => "Does not meet Graham's conservative standards",
        }
    }
}
