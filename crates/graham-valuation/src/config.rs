//! Valuation configuration.

use serde::{Deserialize, Serialize};

/// Tunable multipliers for the valuation methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValuationConfig {
    /// Multiplier applied to reported capex to estimate maintenance capex (default: 1.2)
    pub capex_multiplier: f64,
    /// Multiplier on depreciation used when capex is unreported (default: 1.1)
    pub depreciation_conservatism: f64,
    /// Haircut on working capital (default: 0.9).
    ///
    /// Reported alongside the other adjustments; no method applies it to a value.
    pub working_capital_adjustment: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            capex_multiplier: 1.2,
            depreciation_conservatism: 1.1,
            working_capital_adjustment: 0.9,
        }
    }
}
