//! 10-K and 10-Q filing index for audit trails.

use super::client::{EdgarClient, SEC_WWW_URL, Submissions};
use crate::error::Result;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Forms kept in the audit trail.
pub const AUDIT_FORMS: [&str; 4] = ["10-K", "10-Q", "10-K/A", "10-Q/A"];

/// One periodic report filed with the SEC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRecord {
    /// Form type (e.g., "10-K")
    pub form_type: String,
    /// Filing date
    pub filing_date: NaiveDate,
    /// Accession number (e.g., "0000320193-23-000106")
    pub accession_number: String,
    /// URL of the primary document
    pub filing_url: String,
    /// Calendar year of the filing date
    pub year: i32,
    /// Calendar quarter of the filing date (1-4)
    pub quarter: u32,
}

/// Calendar quarter of a date.
pub const fn quarter_of(month: u32) -> u32 {
    (month - 1) / 3 + 1
}

/// Periodic filings from a submissions response, newest first.
///
/// Keeps [`AUDIT_FORMS`] filed within `years * 365` days of `today`. Entries
/// with missing columns or unparseable dates are skipped.
pub fn parse_filings(submissions: &Submissions, years: u32, today: NaiveDate) -> Vec<FilingRecord> {
    let recent = &submissions.filings.recent;
    let cutoff = today - Duration::days(i64::from(years) * 365);

    let mut filings: Vec<FilingRecord> = (0..recent.form.len())
        .filter_map(|i| {
            let form = recent.form.get(i)?;
            if !AUDIT_FORMS.contains(&form.as_str()) {
                return None;
            }
            let date_str = recent.filing_date.get(i)?;
            let Ok(filing_date) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d") else {
                debug!(index = i, date = %date_str, "Skipping filing with bad date");
                return None;
            };
            if filing_date < cutoff {
                return None;
            }
            let accession = recent.accession_number.get(i)?;
            let document = recent.primary_document.get(i)?;

            Some(FilingRecord {
                form_type: form.clone(),
                filing_date,
                accession_number: accession.clone(),
                filing_url: format!(
                    "{SEC_WWW_URL}/Archives/edgar/data/{}/{}/{}",
                    submissions.cik,
                    accession.replace('-', ""),
                    document
                ),
                year: filing_date.year(),
                quarter: quarter_of(filing_date.month()),
            })
        })
        .collect();

    filings.sort_by(|a, b| b.filing_date.cmp(&a.filing_date));
    filings
}

impl EdgarClient {
    /// Periodic filings for `ticker` filed within `years` years of `today`.
    pub async fn periodic_filings(
        &self,
        ticker: &str,
        years: u32,
        today: NaiveDate,
    ) -> Result<Vec<FilingRecord>> {
        let cik = self.company_cik(ticker).await?;
        let submissions = self.submissions(&cik).await?;
        Ok(parse_filings(&submissions, years, today))
    }
}

/// Placeholder filings for offline runs: a 10-K each March and 10-Qs in May,
/// August and November for the `years` years ending `current_year`.
pub fn mock_filings(ticker: &str, years: u32, current_year: i32) -> Vec<FilingRecord> {
    let first_year = current_year - years as i32 + 1;
    let mut filings = Vec::new();

    for year in first_year..=current_year {
        if let Some(filing_date) = NaiveDate::from_ymd_opt(year, 3, 15) {
            filings.push(FilingRecord {
                form_type: "10-K".to_string(),
                filing_date,
                accession_number: format!("0000000000-{year}-000001"),
                filing_url: format!("{SEC_WWW_URL}/Archives/edgar/data/mock/{ticker}-10K-{year}.htm"),
                year,
                quarter: 1,
            });
        }

        for quarter in 1..=3u32 {
            let Some(filing_date) = NaiveDate::from_ymd_opt(year, quarter * 3 + 2, 15) else {
                continue;
            };
            filings.push(FilingRecord {
                form_type: "10-Q".to_string(),
                filing_date,
                accession_number: format!("0000000000-{year}-00000{}", quarter + 1),
                filing_url: format!(
                    "{SEC_WWW_URL}/Archives/edgar/data/mock/{ticker}-10Q-{year}Q{quarter}.htm"
                ),
                year,
                quarter,
            });
        }
    }

    filings
}

/// First filing of `form_type` in `year`.
pub fn filing_for_year<'a>(
    filings: &'a [FilingRecord],
    year: i32,
    form_type: &str,
) -> Option<&'a FilingRecord> {
    filings
        .iter()
        .find(|f| f.year == year && f.form_type == form_type)
}
