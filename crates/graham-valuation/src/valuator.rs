//! Runs every valuation method over one ticker.

use crate::{
    config::ValuationConfig,
    estimate::ValuationEstimate,
    methods::{AssetBased, ConservativeDcf, EarningsPowerValue, ValuationModel},
    metrics::{MetricsSnapshot, extract},
    statement::{CompanyProfile, StatementRecord},
};

/// Extracts metrics and applies EPV, asset-based and DCF valuation, in that order.
#[derive(Debug, Clone, Default)]
pub struct Valuator {
    config: ValuationConfig,
    epv: EarningsPowerValue,
    asset: AssetBased,
    dcf: ConservativeDcf,
}

impl Valuator {
    /// Create a valuator.
    pub const fn new(config: ValuationConfig) -> Self {
        Self {
            config,
            epv: EarningsPowerValue::with_config(config),
            asset: AssetBased,
            dcf: ConservativeDcf,
        }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// The methods applied, in output order.
    pub fn models(&self) -> [&dyn ValuationModel; 3] {
        [&self.epv, &self.asset, &self.dcf]
    }

    /// Extract metrics and collect every estimate that could be computed.
    pub fn value_all(
        &self,
        statements: &[StatementRecord],
        profile: &CompanyProfile,
        current_price: f64,
    ) -> (Vec<ValuationEstimate>, MetricsSnapshot) {
        let metrics = extract(statements, profile, current_price, &self.config);
        let estimates = self
            .models()
            .into_iter()
            .filter_map(|model| model.estimate(statements, current_price, &metrics))
            .collect();
        (estimates, metrics)
    }
}
