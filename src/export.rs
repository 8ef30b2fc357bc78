//! CSV export of classified papers.

use crate::error::Result;
use crate::paper::{PaperRow, PAPER_COLUMNS};
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the header and one record per row to any writer.
///
/// The header is always written, even for an empty slice.
pub fn write_rows<W: io::Write>(writer: W, rows: &[PaperRow]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(PAPER_COLUMNS)?;
    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Save rows to a CSV file, creating parent directories as needed.
///
/// Returns the absolute path of the written file.
pub fn save_csv(path: &Path, rows: &[PaperRow]) -> Result<PathBuf> {
    let abs_path = std::path::absolute(path)?;
    if let Some(parent) = abs_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(&abs_path)?;
    write_rows(io::BufWriter::new(file), rows)?;

    info!(path = %abs_path.display(), rows = rows.len(), "Saved CSV");
    Ok(abs_path)
}

/// Print rows as CSV to stdout
pub fn print_csv(rows: &[PaperRow]) -> Result<()> {
    let stdout = io::stdout();
    write_rows(stdout.lock(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> PaperRow {
        PaperRow {
            pubmed_id: "38000001".to_string(),
            title: "Targeting KRAS, \"quoted\"".to_string(),
            publication_date: "2023-12-05".to_string(),
            non_academic_authors: "Grace Hopper; Alan Turing".to_string(),
            company_affiliations: "Pfizer Inc.".to_string(),
            corresponding_email: "grace@pfizer.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_write_rows_header_and_quoting() {
        let mut out = Vec::new();
        write_rows(&mut out, &[row()]).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("PubmedID,Title,Publication Date,Non-academicAuthor(s),CompanyAffiliation(s),Corresponding Author Email")
        );
        assert_eq!(
            lines.next(),
            Some("38000001,\"Targeting KRAS, \"\"quoted\"\"\",2023-12-05,Grace Hopper; Alan Turing,Pfizer Inc.,grace@pfizer.com")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_rows_empty_still_has_header() {
        let mut out = Vec::new();
        write_rows(&mut out, &[]).expect("write");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("PubmedID,"));
    }

    #[test]
    fn test_save_csv_creates_dirs_and_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("out.csv");

        let written = save_csv(&path, &[row()]).expect("save");
        assert!(written.is_absolute());
        assert!(written.exists());

        let mut reader = csv::Reader::from_path(&written).expect("reader");
        let rows: Vec<PaperRow> = reader
            .deserialize()
            .collect::<std::result::Result<_, _>>()
            .expect("deserialize");
        assert_eq!(rows, vec![row()]);
    }
}
