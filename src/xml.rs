//! PubMed efetch XML parsing.
//!
//! Streams `PubmedArticleSet/PubmedArticle` with `quick_xml` and keeps only what the
//! classifier needs: PMID, title, journal publication date and authors with their
//! affiliation strings.

use crate::error::Result;
use crate::paper::{RawAuthor, RawPaper};
use chrono::{Month, NaiveDate};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};

/// Leaf elements whose text content we collect
const CAPTURED: &[&str] = &[
    "PMID",
    "ArticleTitle",
    "Year",
    "Month",
    "Day",
    "MedlineDate",
    "LastName",
    "ForeName",
    "Initials",
    "CollectiveName",
    "Affiliation",
];

#[derive(Debug, Default)]
struct PubDateParts {
    year: Option<String>,
    month: Option<String>,
    day: Option<String>,
    medline_date: Option<String>,
}

#[derive(Debug, Default)]
struct ArticleBuilder {
    pmid: Option<String>,
    title: String,
    pub_date: PubDateParts,
    authors: Vec<RawAuthor>,
}

#[derive(Debug, Default)]
struct AuthorBuilder {
    last_name: String,
    fore_name: String,
    initials: String,
    collective_name: String,
    affiliations: Vec<String>,
}

impl AuthorBuilder {
    fn build(self) -> RawAuthor {
        let given = if self.fore_name.is_empty() {
            self.initials
        } else {
            self.fore_name
        };
        let mut name = [given.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            name = self.collective_name;
        }

        RawAuthor {
            name,
            affiliations: self.affiliations,
        }
    }
}

/// Parse an efetch (`retmode=xml`) response into raw papers.
///
/// Articles without a PMID are skipped. Malformed XML is an error.
pub fn parse_efetch_xml(xml: &str) -> Result<Vec<RawPaper>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut papers = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut article: Option<ArticleBuilder> = None;
    let mut author: Option<AuthorBuilder> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "PubmedArticle" => article = Some(ArticleBuilder::default()),
                    "Author" if parent(&stack) == Some("AuthorList") && article.is_some() => {
                        author = Some(AuthorBuilder::default());
                    }
                    n if CAPTURED.contains(&n) => text.clear(),
                    _ => {}
                }
                stack.push(name);
            }
            Event::Text(e) => {
                let chunk = e
                    .unescape()
                    .map(|t| t.into_owned())
                    .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                text.push_str(&chunk);
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::End(_) => {
                let Some(name) = stack.pop() else {
                    continue;
                };
                let value = collapse_whitespace(&text);
                let parent_name = parent(&stack);
                let grandparent = stack.len().checked_sub(2).map(|i| stack[i].as_str());

                if let Some(current) = article.as_mut() {
                    match (name.as_str(), parent_name) {
                        ("PMID", Some("MedlineCitation")) if current.pmid.is_none() => {
                            current.pmid = Some(value);
                        }
                        ("ArticleTitle", Some("Article")) => current.title = value,
                        ("Year" | "Month" | "Day" | "MedlineDate", Some("PubDate"))
                            if grandparent == Some("JournalIssue") =>
                        {
                            let slot = match name.as_str() {
                                "Year" => &mut current.pub_date.year,
                                "Month" => &mut current.pub_date.month,
                                "Day" => &mut current.pub_date.day,
                                _ => &mut current.pub_date.medline_date,
                            };
                            *slot = Some(value);
                        }
                        ("Author", Some("AuthorList")) => {
                            if let Some(done) = author.take() {
                                current.authors.push(done.build());
                            }
                        }
                        (field, Some("Author")) => {
                            if let Some(a) = author.as_mut() {
                                match field {
                                    "LastName" => a.last_name = value,
                                    "ForeName" => a.fore_name = value,
                                    "Initials" => a.initials = value,
                                    "CollectiveName" => a.collective_name = value,
                                    _ => {}
                                }
                            }
                        }
                        ("Affiliation", Some("AffiliationInfo")) => {
                            if let Some(a) = author.as_mut() {
                                if !value.is_empty() {
                                    a.affiliations.push(value);
                                }
                            }
                        }
                        _ => {}
                    }
                }

                if name == "PubmedArticle" {
                    if let Some(done) = article.take() {
                        match done.pmid {
                            Some(pmid) if !pmid.is_empty() => papers.push(RawPaper {
                                pmid,
                                title: done.title,
                                publication_date: format_pub_date(&done.pub_date),
                                authors: done.authors,
                            }),
                            _ => warn!(title = %done.title, "Skipping article without PMID"),
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(count = papers.len(), "Parsed efetch XML");
    Ok(papers)
}

/// Innermost open element
fn parent(stack: &[String]) -> Option<&str> {
    stack.last().map(String::as_str)
}

/// Normalize a PubDate into `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
///
/// A MedlineDate ("2019 Nov-Dec") is returned verbatim. Unrecognized month or
/// impossible day values fall back to the raw parts joined with `-`.
fn format_pub_date(parts: &PubDateParts) -> String {
    let Some(year) = parts.year.as_deref().filter(|y| !y.is_empty()) else {
        return parts.medline_date.clone().unwrap_or_default();
    };

    let raw = || {
        [Some(year), parts.month.as_deref(), parts.day.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    };

    let Some(month) = parts.month.as_deref().filter(|m| !m.is_empty()) else {
        return year.to_string();
    };
    let (Ok(year_num), Some(month_num)) = (year.parse::<i32>(), parse_month(month)) else {
        return raw();
    };

    match parts.day.as_deref().filter(|d| !d.is_empty()) {
        None => format!("{:04}-{:02}", year_num, month_num),
        Some(day) => day
            .parse::<u32>()
            .ok()
            .and_then(|d| NaiveDate::from_ymd_opt(year_num, month_num, d))
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(raw),
    }
}

/// Month as 1-12 from "3", "03", "Mar" or "March"
fn parse_month(month: &str) -> Option<u32> {
    let month = month.trim();
    if let Ok(n) = month.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    month.parse::<Month>().ok().map(|m| m.number_from_month())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
