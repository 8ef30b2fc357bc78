//! Affiliation classification heuristic.
//!
//! Decides whether a free-text PubMed affiliation belongs to industry (pharma/biotech)
//! or to an academic institution, and pulls out a best-guess company name and email.
//!
//! The rules are fixed keyword lists:
//!
//! - any academic marker makes the affiliation academic
//! - otherwise any industry marker makes it non-academic
//! - otherwise it stays unclassified

use crate::error::Result;
use regex::Regex;

/// Industry word stems, matched anywhere in the text ("biopharma", "Therapeutics").
pub const INDUSTRY_STEMS: &[&str] = &[
    "pharma",
    "pharmaceutical",
    "biotech",
    "corp",
    "company",
    "industries",
    "laboratories",
    "biosciences",
    "therapeutics",
    "genomics",
    "diagnostics",
];

/// Legal-form suffixes, matched only as standalone tokens ("Inc." but not "Princeton").
///
/// A suffix must follow whitespace, `,`, `;`, `(` or the start of the text, so the
/// trailing "S.A." of "U.S.A." is not read as a company form.
pub const INDUSTRY_SUFFIXES: &[&str] = &[
    "inc", "ltd", "gmbh", "co.", "llc", "plc", "s.a.", "s.p.a.", "labs",
];

/// Academic markers. Any hit overrides industry markers.
pub const ACADEMIC_KEYWORDS: &[&str] = &[
    "university",
    "college",
    "institute",
    "school",
    "faculty",
    "hospital",
    "center",
    "centre",
    "department",
    "academy",
];

/// Outcome of classifying one affiliation string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AffiliationKind {
    Academic,
    NonAcademic,
    Unclassified,
}

/// Compiled keyword matchers for the affiliation heuristic
#[derive(Debug, Clone)]
pub struct AffiliationClassifier {
    industry_stem: Regex,
    industry_suffix: Regex,
    academic: Regex,
    email: Regex,
    address_label: Regex,
}

impl AffiliationClassifier {
    /// Compile the keyword lists into matchers
    pub fn new() -> Result<Self> {
        let stems = alternation(INDUSTRY_STEMS);
        let suffixes = alternation(INDUSTRY_SUFFIXES);
        let academic = alternation(ACADEMIC_KEYWORDS);

        Ok(Self {
            industry_stem: Regex::new(&format!("(?i){}", stems))?,
            industry_suffix: Regex::new(&format!(
                r"(?i)(?:^|[\s,;(])(?:{})(?:$|[^\p{{L}}\p{{N}}])",
                suffixes
            ))?,
            academic: Regex::new(&format!("(?i){}", academic))?,
            email: Regex::new(r"[\w.+-]+@[\w-]+(?:\.[\w-]+)+")?,
            address_label: Regex::new(r"(?i)electronic\s+address\s*:?")?,
        })
    }

    /// Classify a single affiliation string.
    ///
    /// Email addresses are removed before matching so that a domain such as
    /// `@labs.example.com` cannot flip the result.
    pub fn classify(&self, affiliation: &str) -> AffiliationKind {
        let text = self.strip_email(affiliation);
        let text = text.trim();
        if text.is_empty() {
            return AffiliationKind::Unclassified;
        }

        if self.academic.is_match(text) {
            AffiliationKind::Academic
        } else if self.has_industry_marker(text) {
            AffiliationKind::NonAcademic
        } else {
            AffiliationKind::Unclassified
        }
    }

    /// True if the affiliation looks like a pharma/biotech company
    pub fn is_non_academic(&self, affiliation: &str) -> bool {
        self.classify(affiliation) == AffiliationKind::NonAcademic
    }

    /// First email address in the text, if any
    pub fn extract_email(&self, text: &str) -> Option<String> {
        self.email.find(text).map(|m| m.as_str().to_string())
    }

    /// Best-guess company name for an affiliation.
    ///
    /// Returns the first comma/semicolon separated segment that carries an industry
    /// marker. A segment that is only a legal suffix ("Genentech, Inc.") is joined
    /// with the segment before it. Falls back to the whole cleaned affiliation.
    pub fn company_name(&self, affiliation: &str) -> String {
        let cleaned = self.strip_email(affiliation);
        let cleaned = self.address_label.replace_all(&cleaned, "");
        let segments: Vec<&str> = cleaned
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        for (idx, segment) in segments.iter().enumerate() {
            if !self.has_industry_marker(segment) {
                continue;
            }
            if idx > 0 && is_bare_suffix(segment) {
                return collapse_whitespace(&format!("{}, {}", segments[idx - 1], segment));
            }
            return collapse_whitespace(segment);
        }

        collapse_whitespace(cleaned.trim().trim_end_matches([',', ';', '.']))
    }

    fn has_industry_marker(&self, text: &str) -> bool {
        self.industry_stem.is_match(text) || self.industry_suffix.is_match(text)
    }

    fn strip_email(&self, text: &str) -> String {
        self.email.replace_all(text, " ").into_owned()
    }
}

/// Build a regex alternation from literal keywords
fn alternation(words: &[&str]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

/// True if the segment is nothing but a legal-form suffix like "Inc." or "Ltd"
fn is_bare_suffix(segment: &str) -> bool {
    let lower = segment.trim().to_lowercase();
    INDUSTRY_SUFFIXES
        .iter()
        .any(|s| lower == *s || lower.trim_end_matches('.') == s.trim_end_matches('.'))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> AffiliationClassifier {
        AffiliationClassifier::new().expect("keyword regexes compile")
    }

    #[test]
    fn test_industry_affiliations() {
        let c = classifier();
        assert!(c.is_non_academic("Pfizer Inc., Groton, CT, USA."));
        assert!(c.is_non_academic("Novartis Pharma AG, Basel, Switzerland"));
        assert!(c.is_non_academic("Genentech, Inc., South San Francisco, CA 94080, USA"));
        assert!(c.is_non_academic("Moderna Therapeutics, Cambridge, MA"));
        assert!(c.is_non_academic("Jiangsu Hengrui Medicine Co., Ltd., Shanghai, China"));
        assert!(c.is_non_academic("Roche Diagnostics GmbH, Penzberg, Germany"));
    }

    #[test]
    fn test_academic_overrides_industry() {
        let c = classifier();
        assert_eq!(
            c.classify("Department of Pharmacology, University of Oxford, Oxford, UK"),
            AffiliationKind::Academic
        );
        assert_eq!(
            c.classify("Broad Institute, Cambridge, MA; Biotech Ventures"),
            AffiliationKind::Academic
        );
        assert!(!c.is_non_academic("Pfizer Research Center, Groton"));
    }

    #[test]
    fn test_suffixes_need_token_boundaries() {
        let c = classifier();
        // "inc" inside Princeton / province must not count
        assert_eq!(
            c.classify("Princeton, NJ, Guangdong province"),
            AffiliationKind::Unclassified
        );
        assert_eq!(c.classify("Acme Labs, Boston"), AffiliationKind::NonAcademic);
        assert_eq!(c.classify("Syllabus Review Board"), AffiliationKind::Unclassified);
    }

    #[test]
    fn test_country_abbreviation_is_not_a_company_form() {
        let c = classifier();
        for affiliation in [
            "Food and Drug Administration, Silver Spring, MD, U.S.A.",
            "Mayo Clinic, Rochester, MN, U.S.A.",
            "Mayo Clinic, Rochester, MN, U.S.A",
        ] {
            assert_eq!(
                c.classify(affiliation),
                AffiliationKind::Unclassified,
                "{}",
                affiliation
            );
        }
        assert!(c.is_non_academic("Roche S.A., Madrid, Spain"));
        assert!(c.is_non_academic("Chiesi Farmaceutici (S.p.A.), Parma"));
        assert_eq!(
            c.company_name("Sanofi Pasteur S.A., Lyon, France"),
            "Sanofi Pasteur S.A."
        );
    }

    #[test]
    fn test_email_domain_does_not_classify() {
        let c = classifier();
        assert_eq!(
            c.classify("Boston, MA. Electronic address: j.doe@labs.example.com."),
            AffiliationKind::Unclassified
        );
    }

    #[test]
    fn test_empty_affiliation() {
        let c = classifier();
        assert_eq!(c.classify(""), AffiliationKind::Unclassified);
        assert_eq!(c.classify("   "), AffiliationKind::Unclassified);
        assert_eq!(c.extract_email(""), None);
    }

    #[test]
    fn test_extract_email() {
        let c = classifier();
        assert_eq!(
            c.extract_email("Pfizer Inc., New York. Electronic address: jane.doe@pfizer.com."),
            Some("jane.doe@pfizer.com".to_string())
        );
        assert_eq!(
            c.extract_email("a+b@x-y.co.uk; second@other.org"),
            Some("a+b@x-y.co.uk".to_string())
        );
        assert_eq!(c.extract_email("no address here"), None);
    }

    #[test]
    fn test_company_name() {
        let c = classifier();
        assert_eq!(c.company_name("Pfizer Inc., Groton, CT, USA."), "Pfizer Inc.");
        assert_eq!(
            c.company_name("Genentech, Inc., South San Francisco, CA, USA"),
            "Genentech, Inc."
        );
        assert_eq!(
            c.company_name("Oncology R&D, AstraZeneca Pharmaceuticals LP, Waltham, MA. Electronic address: x@az.com."),
            "AstraZeneca Pharmaceuticals LP"
        );
        assert_eq!(c.company_name("  Somewhere   Else.  "), "Somewhere Else");
    }
}
