//! SEC EDGAR data: CIK lookup, filing index and company-facts fundamentals.
//!
//! ```no_run
//! use graham_data::edgar::EdgarClient;
//!
//! # async fn example() -> graham_data::Result<()> {
//! let client = EdgarClient::new()?;
//! let cik = client.company_cik("AAPL").await?;
//! let submissions = client.submissions(&cik).await?;
//! println!("{} has {} recent filings", submissions.name, submissions.filings.recent.form.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod filings;
pub mod fundamentals;
mod provider;

pub use client::{
    CompanyFacts, EdgarClient, FactValue, FilingsContainer, FilingsRecent, Submissions, TagFacts,
    pad_cik,
};
pub use filings::{FilingRecord, filing_for_year, mock_filings, parse_filings};
pub use fundamentals::annual_statements;
pub use provider::EdgarProvider;
