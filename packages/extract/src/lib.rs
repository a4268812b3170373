#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Table extraction and normalization for semester gradesheet PDFs.
//!
//! Gradesheets are published as multi-page PDF tables. This crate turns
//! raw document bytes into one canonical table — rows concatenated across
//! pages, the first row promoted to column names — and looks up a single
//! student's row by roll number, producing an ordered [`ResultRecord`].
//!
//! PDF text extraction is delegated to [`pdf_extract`]; everything after
//! that (table splitting, header resolution, lookup) lives here.

pub mod page_tables;
pub mod table;

use std::panic::{self, AssertUnwindSafe};

use serde::Deserialize;

pub use table::{NormalizedTable, ROLL_NO_KEY, RawTable, ResultRecord};

/// Errors specific to gradesheet extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Pdf(String),

    /// The document yielded no table rows at all.
    #[error("document contained no table rows")]
    EmptyDocument,

    /// A data row's width does not match the header row.
    #[error("data row {row} has {actual} cells, expected {expected}")]
    Shape {
        /// Zero-based index of the offending data row.
        row: usize,
        /// Header width.
        expected: usize,
        /// Actual cell count of the row.
        actual: usize,
    },

    /// More than one row matched the roll number under
    /// [`DuplicatePolicy::Error`].
    #[error("roll number {roll_no} matched {matches} rows")]
    AmbiguousRollNo {
        /// The requested roll number.
        roll_no: String,
        /// How many rows carried it.
        matches: usize,
    },
}

/// How a page's text lines are split into table cells.
///
/// Configured per gradesheet source, since different issuers lay their
/// tables out differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableLayout {
    /// Cells are separated by runs of two or more spaces — the layout
    /// text extraction produces for ruled tables. Single spaces stay
    /// inside a cell (`"Roll No"` is one cell).
    #[default]
    WhitespaceGap,

    /// Cells are separated by a literal delimiter string.
    Delimited {
        /// Field delimiter (e.g. `"|"`).
        delimiter: String,
    },
}

/// What to do when more than one row shares the requested roll number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Use the first matching row and log a warning.
    #[default]
    FirstMatch,
    /// Fail with [`ExtractError::AmbiguousRollNo`].
    Error,
}

/// Error returned when a [`DuplicatePolicy`] string is not recognized.
#[derive(Debug, thiserror::Error)]
#[error("unknown duplicate policy '{0}' (expected 'first_match' or 'error')")]
pub struct ParseDuplicatePolicyError(String);

impl std::str::FromStr for DuplicatePolicy {
    type Err = ParseDuplicatePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_match" => Ok(Self::FirstMatch),
            "error" => Ok(Self::Error),
            other => Err(ParseDuplicatePolicyError(other.to_owned())),
        }
    }
}

/// Extracts one text string per document page, in page order.
///
/// [`pdf_extract`] can panic on malformed input rather than returning an
/// error, so the call is wrapped in [`std::panic::catch_unwind`] and
/// panics are reported as [`ExtractError::Pdf`].
///
/// # Errors
///
/// Returns [`ExtractError::Pdf`] if the bytes are not a readable PDF.
pub fn page_texts(document: &[u8]) -> Result<Vec<String>, ExtractError> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(document)
    }));
    match result {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractError::Pdf(format!(
            "failed to extract text from PDF: {e}"
        ))),
        Err(_) => Err(ExtractError::Pdf(
            "PDF extraction panicked (malformed document)".to_owned(),
        )),
    }
}

/// Extracts one student's result record from raw gradesheet bytes.
///
/// Collects every table from every page, normalizes them into a single
/// table, and looks up the row whose first cell equals `roll_no` exactly
/// (case sensitive, no trimming). Returns `Ok(None)` when no row matches.
///
/// # Errors
///
/// Returns [`ExtractError`] if the PDF cannot be read, the document holds
/// no table rows, a row's width does not match the header, or the roll
/// number is ambiguous under [`DuplicatePolicy::Error`].
pub fn extract_result(
    document: &[u8],
    roll_no: &str,
    layout: &TableLayout,
    policy: DuplicatePolicy,
) -> Result<Option<ResultRecord>, ExtractError> {
    let mut tables = Vec::new();
    for text in page_texts(document)? {
        tables.extend(page_tables::split_tables(&text, layout));
    }
    log::debug!("Collected {} table(s) from document", tables.len());

    let table = NormalizedTable::from_tables(tables)?;
    log::debug!(
        "Normalized table: {} columns, {} data rows",
        table.columns().len(),
        table.rows().len()
    );

    Ok(table
        .find(roll_no, policy)?
        .map(|row| ResultRecord::from_row(table.columns(), row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_policy_parses_known_values() {
        assert_eq!(
            "first_match".parse::<DuplicatePolicy>().unwrap(),
            DuplicatePolicy::FirstMatch
        );
        assert_eq!(
            "error".parse::<DuplicatePolicy>().unwrap(),
            DuplicatePolicy::Error
        );
    }

    #[test]
    fn duplicate_policy_rejects_unknown_values() {
        assert!("First_Match".parse::<DuplicatePolicy>().is_err());
        assert!("".parse::<DuplicatePolicy>().is_err());
    }

    #[test]
    fn garbage_bytes_are_a_pdf_error() {
        let err = page_texts(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }
}
