//! Graham screening thresholds.

use serde::{Deserialize, Serialize};

/// Graham's combined valuation limit: P/E times P/B may not exceed this.
pub const MAX_PE_TIMES_PB: f64 = 22.5;

/// Thresholds for the hard filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrahamCriteria {
    /// Minimum current ratio (default: 2.0)
    pub min_current_ratio: f64,
    /// Maximum debt to equity (default: 0.5)
    pub max_debt_to_equity: f64,
    /// Maximum price to earnings (default: 15.0)
    pub max_pe_ratio: f64,
    /// Maximum price to book (default: 1.5)
    pub max_pb_ratio: f64,
    /// Minimum overall margin of safety (default: 0.5)
    pub min_margin_of_safety: f64,
    /// Years of earnings history Graham asks for (default: 5)
    pub min_earnings_growth_years: u32,
    /// Years of dividends Graham asks for (default: 10)
    pub min_dividend_years: u32,
}

impl Default for GrahamCriteria {
    fn default() -> Self {
        Self {
            min_current_ratio: 2.0,
            max_debt_to_equity: 0.5,
            max_pe_ratio: 15.0,
            max_pb_ratio: 1.5,
            min_margin_of_safety: 0.5,
            min_earnings_growth_years: 5,
            min_dividend_years: 10,
        }
    }
}
