//! Markdown company reports.

use crate::audit::conservative_adjustments;
use crate::export::{NOT_AVAILABLE, format_dollars, format_percent, format_ratio};
use chrono::{DateTime, Utc};
use graham_data::FilingRecord;
use graham_screen::{GrahamCriteria, MAX_PE_TIMES_PB, ScoreInterpretation, ScreenResult};
use graham_valuation::{Confidence, ValuationConfig};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

const GENERAL_RISKS: [&str; 5] = [
    "Value traps: Stock may be cheap for fundamental reasons",
    "Market conditions: Value investing can underperform in growth markets",
    "Management quality: Not directly assessed in quantitative screening",
    "Industry disruption: Financial metrics may not capture technological obsolescence",
    "Liquidity: Some value stocks may have limited trading volume",
];

const DISCLAIMER: &str = "**Disclaimer:** This analysis is for educational purposes only and \
should not be considered as investment advice. Always conduct your own research and consult \
with financial professionals before making investment decisions.";

fn status(passed: bool) -> &'static str {
    if passed { "✅ Pass" } else { "❌ Fail" }
}

const fn confidence_label(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "High",
        Confidence::Medium => "Medium",
        Confidence::Low => "Low",
    }
}

/// Detailed Markdown report for one ranked company.
#[derive(Debug, Clone)]
pub struct CompanyReport<'a> {
    result: &'a ScreenResult,
    valuation: ValuationConfig,
    criteria: GrahamCriteria,
    data_provider: String,
    filings: &'a [FilingRecord],
    generated_at: DateTime<Utc>,
}

impl<'a> CompanyReport<'a> {
    /// Report on `result` with default thresholds and no filings.
    pub fn new(result: &'a ScreenResult) -> Self {
        Self {
            result,
            valuation: ValuationConfig::default(),
            criteria: GrahamCriteria::default(),
            data_provider: "Unknown".to_string(),
            filings: &[],
            generated_at: Utc::now(),
        }
    }

    /// Valuation settings the result was produced with.
    pub const fn with_valuation_config(mut self, valuation: ValuationConfig) -> Self {
        self.valuation = valuation;
        self
    }

    /// Filter thresholds the result was checked against.
    pub const fn with_criteria(mut self, criteria: GrahamCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Name of the data provider.
    pub fn with_data_provider(mut self, data_provider: impl Into<String>) -> Self {
        self.data_provider = data_provider.into();
        self
    }

    /// SEC filings backing the analysis, newest first.
    pub const fn with_filings(mut self, filings: &'a [FilingRecord]) -> Self {
        self.filings = filings;
        self
    }

    /// Override the generation timestamp.
    pub const fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Render the report.
    pub fn to_markdown(&self) -> Result<String, ReportError> {
        let r = self.result;
        let mut output = String::new();

        output.push_str(&format!("# {} ({})\n", r.company_name, r.ticker));
        output.push_str("**Benjamin Graham Value Analysis Report**\n");
        output.push_str(&format!(
            "Generated: {}\n\n",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        self.executive_summary(&mut output);
        self.key_metrics(&mut output);
        self.valuation_analysis(&mut output);
        self.score_breakdown(&mut output);
        self.adjustments(&mut output);
        self.risk_factors(&mut output);
        self.assumptions(&mut output);
        self.sec_filings(&mut output);

        output.push_str("## Machine-Readable Data\n\n```json\n");
        output.push_str(&serde_json::to_string_pretty(r)?);
        output.push_str("\n```\n");

        Ok(output)
    }

    /// Write the report to `path`.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        fs::write(path, self.to_markdown()?)?;
        debug!(ticker = %self.result.ticker, path = %path.display(), "Report written");
        Ok(())
    }

    fn executive_summary(&self, output: &mut String) {
        let r = self.result;
        let thesis = r.thesis();

        output.push_str("## Executive Summary\n\n");
        output.push_str(&format!("**Sector:** {}\n", r.sector));
        output.push_str(&format!("**Current Price:** {}\n", format_dollars(r.current_price)));
        output.push_str(&format!(
            "**Intrinsic Value:** {}\n",
            format_dollars(r.intrinsic_value)
        ));
        output.push_str(&format!(
            "**Margin of Safety:** {}\n",
            format_percent(r.margin_of_safety)
        ));
        output.push_str(&format!("**Graham Score:** {:.1}/100\n", r.graham_score));
        output.push_str(&format!("**Rank:** #{}\n\n", r.rank));
        output.push_str(&format!(
            "**Investment Thesis:** **{thesis}** - {}\n\n",
            thesis.explanation()
        ));
    }

    fn key_metrics(&self, output: &mut String) {
        let m = &self.result.metrics;
        let c = &self.criteria;

        output.push_str("## Key Financial Metrics\n\n");
        output.push_str("| Metric | Value | Graham Criterion | Status |\n");
        output.push_str("|--------|-------|------------------|--------|\n");

        let mut row = |name: &str, value: String, criterion: String, passed: bool| {
            output.push_str(&format!("| {name} | {value} | {criterion} | {} |\n", status(passed)));
        };

        row(
            "Current Ratio",
            format_ratio(m.current_ratio),
            format!("≥ {:.1}", c.min_current_ratio),
            m.current_ratio.is_some_and(|v| v >= c.min_current_ratio),
        );
        row(
            "Debt/Equity",
            format_ratio(m.debt_to_equity),
            format!("≤ {:.1}", c.max_debt_to_equity),
            m.debt_to_equity.is_some_and(|v| v <= c.max_debt_to_equity),
        );
        row(
            "P/E Ratio",
            format_ratio(m.pe_ratio),
            format!("≤ {:.1}", c.max_pe_ratio),
            m.pe_ratio.is_some_and(|v| v <= c.max_pe_ratio),
        );
        row(
            "P/B Ratio",
            format_ratio(m.pb_ratio),
            format!("≤ {:.1}", c.max_pb_ratio),
            m.pb_ratio.is_some_and(|v| v <= c.max_pb_ratio),
        );
        if let (Some(pe), Some(pb)) = (m.pe_ratio, m.pb_ratio) {
            let product = pe * pb;
            row(
                "P/E × P/B",
                format!("{product:.1}"),
                format!("≤ {MAX_PE_TIMES_PB:.1}"),
                product <= MAX_PE_TIMES_PB,
            );
        }
        row(
            "Return on Equity",
            m.roe
                .map_or_else(|| NOT_AVAILABLE.to_string(), format_percent),
            "> 0%".to_string(),
            m.roe.is_some_and(|v| v > 0.0),
        );
        row(
            "Earnings Growth",
            m.earnings_growth
                .map_or_else(|| NOT_AVAILABLE.to_string(), format_percent),
            format!("Consistent {} yrs, ≥ 0%", c.min_earnings_growth_years),
            m.earnings_growth.is_some_and(|v| v >= 0.0),
        );
        row(
            "Dividend Years",
            m.dividend_years.to_string(),
            format!("≥ {}", c.min_dividend_years),
            m.dividend_years >= c.min_dividend_years,
        );
        row(
            "Book Value/Share",
            m.book_value_per_share
                .map_or_else(|| NOT_AVAILABLE.to_string(), format_dollars),
            "> $0".to_string(),
            m.book_value_per_share.is_some_and(|v| v > 0.0),
        );
        output.push('\n');
    }

    fn valuation_analysis(&self, output: &mut String) {
        let r = self.result;
        output.push_str("## Valuation Analysis\n\n");
        output.push_str(&format!(
            "**Triangulated Intrinsic Value:** {}\n",
            format_dollars(r.intrinsic_value)
        ));
        output.push_str(&format!(
            "**Current Market Price:** {}\n",
            format_dollars(r.current_price)
        ));
        output.push_str(&format!(
            "**Margin of Safety:** {}\n\n",
            format_percent(r.margin_of_safety)
        ));

        for (i, estimate) in r.valuations.iter().enumerate() {
            output.push_str(&format!("### {}. {}\n\n", i + 1, estimate.method));
            output.push_str(&format!(
                "**Intrinsic Value:** {}\n",
                format_dollars(estimate.intrinsic_value)
            ));
            output.push_str(&format!(
                "**Margin of Safety:** {}\n",
                format_percent(estimate.margin_of_safety)
            ));
            output.push_str(&format!(
                "**Confidence Level:** {}\n\n",
                confidence_label(estimate.confidence)
            ));

            if !estimate.assumptions.is_empty() {
                output.push_str("**Key Assumptions:**\n");
                for assumption in &estimate.assumptions {
                    output.push_str(&format!("- {assumption}\n"));
                }
                output.push('\n');
            }

            if !estimate.warnings.is_empty() {
                output.push_str("**Warnings:**\n");
                for warning in &estimate.warnings {
                    output.push_str(&format!("- ⚠️ {warning}\n"));
                }
                output.push('\n');
            }
        }
    }

    fn score_breakdown(&self, output: &mut String) {
        let r = self.result;
        let breakdown = r.score_breakdown();
        let interpretation = ScoreInterpretation::from_score(r.graham_score);

        output.push_str("## Graham Score Breakdown\n\n");
        output.push_str(&format!("**Total Score:** {:.1}/100\n\n", r.graham_score));
        output.push_str("| Component | Points | Maximum | Measures |\n");
        output.push_str("|-----------|--------|---------|----------|\n");
        for (name, points, max, measures) in [
            ("Liquidity", breakdown.liquidity, 20, "Current ratio strength"),
            ("Leverage", breakdown.leverage, 15, "Debt management"),
            ("Valuation", breakdown.valuation, 25, "P/E and P/B ratios"),
            ("Growth", breakdown.growth, 15, "Earnings consistency"),
            ("Dividends", breakdown.dividends, 10, "Dividend track record"),
            ("Safety Margin", breakdown.safety_margin, 15, "Margin of safety bonus"),
        ] {
            output.push_str(&format!("| {name} | {points} | {max} | {measures} |\n"));
        }
        output.push_str(&format!(
            "\n**Score Interpretation:** **{interpretation}** - {}\n\n",
            interpretation.explanation()
        ));
    }

    fn adjustments(&self, output: &mut String) {
        output.push_str("## Conservative Adjustments Applied\n\n");
        output.push_str(
            "This analysis applies Benjamin Graham's conservative approach with the following adjustments:\n\n",
        );
        for adjustment in conservative_adjustments(&self.valuation) {
            output.push_str(&format!("- **{}:** {}\n", adjustment.label, adjustment.detail));
        }
        output.push('\n');
    }

    fn risk_factors(&self, output: &mut String) {
        output.push_str("## Risk Factors & Considerations\n\n");

        let mut warnings: Vec<&str> = Vec::new();
        for warning in self.result.valuations.iter().flat_map(|v| &v.warnings) {
            if !warnings.contains(&warning.as_str()) {
                warnings.push(warning);
            }
        }

        if !warnings.is_empty() {
            output.push_str("**Valuation Risks:**\n");
            for warning in warnings {
                output.push_str(&format!("- {warning}\n"));
            }
            output.push('\n');
        }

        output.push_str("**General Investment Risks:**\n");
        for risk in GENERAL_RISKS {
            output.push_str(&format!("- {risk}\n"));
        }
        output.push('\n');
    }

    fn assumptions(&self, output: &mut String) {
        output.push_str("## Assumptions & Data Sources\n\n");
        output.push_str("**Key Assumptions:**\n");
        output.push_str("- Financial data accuracy depends on company filings\n");
        output.push_str("- Market prices reflect current sentiment, not intrinsic value\n");
        output.push_str("- Historical performance patterns may continue\n");
        output.push_str("- Conservative estimates favor safety over precision\n\n");
        output.push_str("**Data Sources:**\n");
        output.push_str(&format!("- Financial data: {}\n", self.data_provider));
        output.push_str("- SEC filings: Referenced for audit trail\n");
        output.push_str("- Market prices: Latest available close\n\n");
        output.push_str(&format!(
            "**Analysis Date:** {}\n\n",
            self.generated_at.format("%Y-%m-%d")
        ));
        output.push_str(DISCLAIMER);
        output.push_str("\n\n");
    }

    fn sec_filings(&self, output: &mut String) {
        output.push_str("## SEC Filings\n\n");
        if self.filings.is_empty() {
            output.push_str("No SEC filings were retrieved for this analysis.\n\n");
            return;
        }

        output.push_str("| Form | Filed | Period | Document |\n");
        output.push_str("|------|-------|--------|----------|\n");
        for filing in self.filings {
            output.push_str(&format!(
                "| {} | {} | Q{} {} | [{}]({}) |\n",
                filing.form_type,
                filing.filing_date,
                filing.quarter,
                filing.year,
                filing.accession_number,
                filing.filing_url
            ));
        }
        output.push('\n');
    }
}
