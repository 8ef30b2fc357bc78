//! Paper records flowing between the fetch and classify stages.

use serde::{Deserialize, Serialize};

/// CSV column order for output rows
pub const PAPER_COLUMNS: &[&str] = &[
    "PubmedID",
    "Title",
    "Publication Date",
    "Non-academicAuthor(s)",
    "CompanyAffiliation(s)",
    "Corresponding Author Email",
];

/// Separator for multi-valued output columns
pub const LIST_SEPARATOR: &str = "; ";

/// One author as parsed from an efetch record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAuthor {
    /// "ForeName LastName", or the collective name for group authors
    pub name: String,
    /// Free-text affiliation strings, one per AffiliationInfo
    pub affiliations: Vec<String>,
}

/// A paper as fetched from PubMed, before classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPaper {
    pub pmid: String,
    pub title: String,
    /// ISO-ish date (YYYY-MM-DD, YYYY-MM, YYYY) or a verbatim MedlineDate
    pub publication_date: String,
    pub authors: Vec<RawAuthor>,
}

/// One output row per paper with at least one non-academic author
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRow {
    #[serde(rename = "PubmedID")]
    pub pubmed_id: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Publication Date")]
    pub publication_date: String,
    #[serde(rename = "Non-academicAuthor(s)")]
    pub non_academic_authors: String,
    #[serde(rename = "CompanyAffiliation(s)")]
    pub company_affiliations: String,
    #[serde(rename = "Corresponding Author Email")]
    pub corresponding_email: String,
    /// Set when any author has an industry affiliation, named or not
    #[serde(skip)]
    pub has_industry_affiliation: bool,
}

impl PaperRow {
    /// True if the heuristic found at least one industry author.
    ///
    /// Authors with no parsed name still count, even though they add nothing to the
    /// author column.
    pub fn has_non_academic_author(&self) -> bool {
        self.has_industry_affiliation || !self.non_academic_authors.is_empty()
    }
}
