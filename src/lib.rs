//! # get_papers_list
//!
//! Fetch PubMed papers and keep the ones with at least one pharma/biotech-affiliated author.
//!
//! ## Modules
//!
//! - [`pubmed`] - E-utilities client (esearch + efetch) with retry and rate limiting
//! - [`xml`] - efetch XML parsing into raw paper records
//! - [`affiliation`] - keyword heuristic for academic vs. industry affiliations
//! - [`classify`] - per-paper classification and filtering
//! - [`export`] - CSV output
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use get_papers_list::{affiliation::AffiliationClassifier, classify, pubmed};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = pubmed::PubMedClient::new(Default::default())?;
//!     let ids = client.search_ids("oncology AND 2024[dp]").await?;
//!     let papers = client.fetch_papers(&ids).await?;
//!     let rows = classify::filter_papers(&AffiliationClassifier::new()?, &papers);
//!     println!("{} papers with industry authors", rows.len());
//!     Ok(())
//! }
//! ```

pub mod affiliation;
pub mod classify;
pub mod error;
pub mod export;
pub mod paper;
pub mod pubmed;
pub mod xml;

pub use error::{PapersError, Result};
pub use paper::{PaperRow, RawAuthor, RawPaper};
