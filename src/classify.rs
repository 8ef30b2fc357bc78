//! Paper-level filtering built on the affiliation heuristic.

use crate::affiliation::{AffiliationClassifier, AffiliationKind};
use crate::paper::{PaperRow, RawPaper, LIST_SEPARATOR};
use tracing::{debug, info};

/// Build the output row for one paper.
///
/// An author counts as non-academic if any one of their affiliations does.
/// Company names are deduplicated case-insensitively (full Unicode lowercase) in
/// first-seen order, and the
/// corresponding email is the first address found scanning authors in order.
pub fn classify_paper(classifier: &AffiliationClassifier, paper: &RawPaper) -> PaperRow {
    let mut authors: Vec<&str> = Vec::new();
    let mut companies: Vec<String> = Vec::new();
    let mut email: Option<String> = None;
    let mut has_industry = false;

    for author in &paper.authors {
        let mut is_industry = false;

        for affiliation in &author.affiliations {
            if classifier.classify(affiliation) == AffiliationKind::NonAcademic {
                is_industry = true;
                let company = classifier.company_name(affiliation);
                let key = company.to_lowercase();
                if !company.is_empty() && !companies.iter().any(|c| c.to_lowercase() == key) {
                    companies.push(company);
                }
            }

            if email.is_none() {
                email = classifier.extract_email(affiliation);
            }
        }

        has_industry |= is_industry;
        if is_industry && !author.name.is_empty() && !authors.contains(&author.name.as_str()) {
            authors.push(&author.name);
        }
    }

    debug!(
        pmid = %paper.pmid,
        industry_authors = authors.len(),
        companies = companies.len(),
        has_email = email.is_some(),
        "Classified paper"
    );

    PaperRow {
        pubmed_id: paper.pmid.clone(),
        title: paper.title.clone(),
        publication_date: paper.publication_date.clone(),
        non_academic_authors: authors.join(LIST_SEPARATOR),
        company_affiliations: companies.join(LIST_SEPARATOR),
        corresponding_email: email.unwrap_or_default(),
        has_industry_affiliation: has_industry,
    }
}

/// Keep only papers with at least one non-academic author, in input order
pub fn filter_papers(classifier: &AffiliationClassifier, papers: &[RawPaper]) -> Vec<PaperRow> {
    let rows: Vec<PaperRow> = papers
        .iter()
        .map(|p| classify_paper(classifier, p))
        .filter(PaperRow::has_non_academic_author)
        .collect();

    info!(
        total = papers.len(),
        matched = rows.len(),
        "Filtered papers with non-academic authors"
    );

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paper::RawAuthor;

    fn author(name: &str, affiliations: &[&str]) -> RawAuthor {
        RawAuthor {
            name: name.to_string(),
            affiliations: affiliations.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn paper(pmid: &str, authors: Vec<RawAuthor>) -> RawPaper {
        RawPaper {
            pmid: pmid.to_string(),
            title: format!("Paper {}", pmid),
            publication_date: "2024-03-01".to_string(),
            authors,
        }
    }

    #[test]
    fn test_classify_mixed_authors() {
        let classifier = AffiliationClassifier::new().expect("classifier");
        let p = paper(
            "111",
            vec![
                author(
                    "Ada Lovelace",
                    &["Department of Chemistry, University of Cambridge. ada@cam.ac.uk"],
                ),
                author(
                    "Grace Hopper",
                    &[
                        "Pfizer Inc., Groton, CT, USA.",
                        "Pfizer Inc., New York, NY. Electronic address: grace@pfizer.com.",
                    ],
                ),
                author("Alan Turing", &["Genentech, Inc., South San Francisco, CA"]),
            ],
        );

        let row = classify_paper(&classifier, &p);
        assert_eq!(row.pubmed_id, "111");
        assert_eq!(row.non_academic_authors, "Grace Hopper; Alan Turing");
        assert_eq!(row.company_affiliations, "Pfizer Inc.; Genentech, Inc.");
        // first email in author order wins, even from an academic author
        assert_eq!(row.corresponding_email, "ada@cam.ac.uk");
    }

    #[test]
    fn test_author_without_affiliation() {
        let classifier = AffiliationClassifier::new().expect("classifier");
        let p = paper("222", vec![author("Nobody", &[])]);

        let row = classify_paper(&classifier, &p);
        assert!(!row.has_non_academic_author());
        assert!(row.company_affiliations.is_empty());
        assert!(row.corresponding_email.is_empty());
    }

    #[test]
    fn test_filter_keeps_order_and_drops_academic() {
        let classifier = AffiliationClassifier::new().expect("classifier");
        let papers = vec![
            paper("1", vec![author("A", &["Moderna Therapeutics, Cambridge, MA"])]),
            paper("2", vec![author("B", &["Harvard Medical School, Boston"])]),
            paper("3", vec![author("C", &["Bayer AG Pharmaceuticals, Berlin"])]),
        ];

        let rows = filter_papers(&classifier, &papers);
        let ids: Vec<&str> = rows.iter().map(|r| r.pubmed_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_company_dedup_folds_non_ascii_case() {
        let classifier = AffiliationClassifier::new().expect("classifier");
        let p = paper(
            "333",
            vec![
                author("A", &["ÉLAN PHARMA, Dublin, Ireland"]),
                author("B", &["Élan Pharma, Athlone, Ireland"]),
                author("C", &["élan pharma, Cork, Ireland"]),
            ],
        );

        let row = classify_paper(&classifier, &p);
        assert_eq!(row.company_affiliations, "ÉLAN PHARMA");
        assert_eq!(row.non_academic_authors, "A; B; C");
    }

    #[test]
    fn test_unnamed_industry_author_keeps_paper() {
        let classifier = AffiliationClassifier::new().expect("classifier");
        let papers = vec![paper(
            "444",
            vec![
                author("", &["Amgen Inc., Thousand Oaks, CA"]),
                author("Ada Lovelace", &["University of Cambridge"]),
            ],
        )];

        let rows = filter_papers(&classifier, &papers);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].has_non_academic_author());
        assert!(rows[0].non_academic_authors.is_empty());
        assert_eq!(rows[0].company_affiliations, "Amgen Inc.");
    }

    #[test]
    fn test_filter_empty_input() {
        let classifier = AffiliationClassifier::new().expect("classifier");
        assert!(filter_papers(&classifier, &[]).is_empty());
    }
}
