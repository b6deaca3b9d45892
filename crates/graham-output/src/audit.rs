//! Audit trail tying an analysis to its SEC filings.

use chrono::{DateTime, Utc};
use graham_data::FilingRecord;
use graham_screen::{GrahamCriteria, MAX_PE_TIMES_PB};
use graham_valuation::{ValuationConfig, ValuationMethod};
use serde::{Deserialize, Serialize};

/// A conservative adjustment applied during valuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Short label, e.g. "Capital Expenditures"
    pub label: String,
    /// What was done
    pub detail: String,
}

impl Adjustment {
    fn new(label: &str, detail: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for Adjustment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.label, self.detail)
    }
}

/// The conservative adjustments implied by a valuation configuration.
pub fn conservative_adjustments(config: &ValuationConfig) -> Vec<Adjustment> {
    vec![
        Adjustment::new(
            "Capital Expenditures",
            format!(
                "Increased by {:.0}% for maintenance estimates",
                (config.capex_multiplier - 1.0) * 100.0
            ),
        ),
        Adjustment::new(
            "Depreciation",
            format!(
                "Conservative factor of {:.1}x applied",
                config.depreciation_conservatism
            ),
        ),
        Adjustment::new(
            "Working Capital",
            format!(
                "Haircut of {:.0}% applied",
                (1.0 - config.working_capital_adjustment) * 100.0
            ),
        ),
        Adjustment::new(
            "Intangible Assets",
            "Excluded from tangible book value calculations",
        ),
        Adjustment::new("Growth Assumptions", "Capped at 5% annually in DCF analysis"),
        Adjustment::new(
            "Discount Rates",
            "10-12% used (higher than current risk-free rates)",
        ),
    ]
}

/// Where the numbers came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSources {
    /// Periodic filings within the analysis window, newest first
    pub sec_filings: Vec<FilingRecord>,
    /// Adjustments applied, as `label: detail`
    pub adjustments_applied: Vec<String>,
}

/// How the analysis was done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Methodology {
    /// Valuation methods triangulated
    pub valuation_methods: Vec<String>,
    /// Assumptions built into the methods
    pub conservative_assumptions: Vec<String>,
    /// Filter rules applied
    pub graham_criteria: Vec<String>,
}

impl Methodology {
    /// Methodology for a set of filter thresholds.
    pub fn new(criteria: &GrahamCriteria) -> Self {
        Self {
            valuation_methods: [
                ValuationMethod::EarningsPower,
                ValuationMethod::AssetBased,
                ValuationMethod::ConservativeDcf,
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            conservative_assumptions: vec![
                "No growth in EPV calculation".to_string(),
                "20% haircut on tangible assets".to_string(),
                "Capped growth rates at 5% in DCF".to_string(),
                "Elevated discount rates (10-12%)".to_string(),
            ],
            graham_criteria: vec![
                format!("Current ratio >= {:.1}", criteria.min_current_ratio),
                format!("Debt/equity <= {:.1}", criteria.max_debt_to_equity),
                format!("PE <= {:.1}", criteria.max_pe_ratio),
                format!("PB <= {:.1}", criteria.max_pb_ratio),
                format!("PE × PB <= {MAX_PE_TIMES_PB:.1}"),
                format!(
                    "Consistent positive earnings over {} years",
                    criteria.min_earnings_growth_years
                ),
                format!(
                    "Margin of safety >= {:.0}%",
                    criteria.min_margin_of_safety * 100.0
                ),
            ],
        }
    }
}

/// Audit record written next to each company report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    /// Ticker symbol
    pub ticker: String,
    /// When the analysis ran
    pub analysis_date: DateTime<Utc>,
    /// Filings and adjustments
    pub data_sources: DataSources,
    /// Methods and rules
    pub methodology: Methodology,
}

impl AuditTrail {
    /// Build an audit trail stamped with the current time.
    pub fn new(
        ticker: impl Into<String>,
        filings: Vec<FilingRecord>,
        config: &ValuationConfig,
        criteria: &GrahamCriteria,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            analysis_date: Utc::now(),
            data_sources: DataSources {
                sec_filings: filings,
                adjustments_applied: conservative_adjustments(config)
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            },
            methodology: Methodology::new(criteria),
        }
    }

    /// Override the analysis date.
    pub const fn with_analysis_date(mut self, analysis_date: DateTime<Utc>) -> Self {
        self.analysis_date = analysis_date;
        self
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
