//! The merged gradesheet table and the per-student result record.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::{DuplicatePolicy, ExtractError};

/// An unprocessed grid of cell values extracted from one block of a page.
pub type RawTable = Vec<Vec<String>>;

/// Key under which the student's roll number is reported. Always the
/// first key of a [`ResultRecord`], whatever the gradesheet calls that
/// column.
pub const ROLL_NO_KEY: &str = "Exam Roll No.";

/// Replaces embedded newlines in a column name with single spaces.
///
/// Idempotent: applying it twice yields the same result as once.
#[must_use]
pub fn normalize_column(name: &str) -> String {
    name.replace('\n', " ")
}

/// The single merged, header-resolved table used for lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl NormalizedTable {
    /// Builds the merged table from per-page tables, in page order.
    ///
    /// All rows are concatenated; the first becomes the header and is
    /// removed from the data rows. Column names are normalized via
    /// [`normalize_column`]. Every data row must be exactly as wide as
    /// the header.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::EmptyDocument`] if no rows were extracted,
    /// or [`ExtractError::Shape`] on a row-width mismatch.
    pub fn from_tables(tables: Vec<RawTable>) -> Result<Self, ExtractError> {
        let mut rows: Vec<Vec<String>> = tables.into_iter().flatten().collect();
        if rows.is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let columns: Vec<String> = rows
            .remove(0)
            .iter()
            .map(|name| normalize_column(name))
            .collect();
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(ExtractError::Shape {
                    row,
                    expected: columns.len(),
                    actual: cells.len(),
                });
            }
        }

        Ok(Self { columns, rows })
    }

    /// Column names, in original document order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Data rows (header excluded).
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Finds the row whose first cell equals `roll_no` exactly — case
    /// sensitive, no trimming. Returns `Ok(None)` when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::AmbiguousRollNo`] when several rows match
    /// under [`DuplicatePolicy::Error`].
    pub fn find(
        &self,
        roll_no: &str,
        policy: DuplicatePolicy,
    ) -> Result<Option<&[String]>, ExtractError> {
        let matches: Vec<&Vec<String>> = self
            .rows
            .iter()
            .filter(|row| row.first().is_some_and(|cell| cell == roll_no))
            .collect();

        match matches.as_slice() {
            [] => Ok(None),
            [only] => Ok(Some(only.as_slice())),
            [first, ..] => match policy {
                DuplicatePolicy::FirstMatch => {
                    log::warn!(
                        "Roll number {roll_no} matched {} rows, using the first",
                        matches.len()
                    );
                    Ok(Some(first.as_slice()))
                }
                DuplicatePolicy::Error => Err(ExtractError::AmbiguousRollNo {
                    roll_no: roll_no.to_owned(),
                    matches: matches.len(),
                }),
            },
        }
    }
}

/// The final ordered key → value representation of one student's result.
///
/// Serializes to a JSON object whose keys appear in insertion order — the
/// record owns its ordering rather than relying on a map type's iteration
/// order. The first key is always [`ROLL_NO_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    fields: Vec<(String, String)>,
}

impl ResultRecord {
    /// Builds the record for one matched row.
    ///
    /// The first column is relabeled [`ROLL_NO_KEY`]; every other column
    /// keeps its normalized name, in original column order.
    #[must_use]
    pub fn from_row(columns: &[String], row: &[String]) -> Self {
        let mut fields = Vec::with_capacity(columns.len());
        fields.push((
            ROLL_NO_KEY.to_owned(),
            row.first().cloned().unwrap_or_default(),
        ));
        for (name, value) in columns.iter().zip(row).skip(1) {
            fields.push((name.clone(), value.clone()));
        }
        Self { fields }
    }

    /// Key → value pairs in serialization order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl Serialize for ResultRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| (*c).to_owned()).collect()
    }

    fn sample_table() -> NormalizedTable {
        NormalizedTable::from_tables(vec![
            vec![
                row(&["Roll No", "Name", "Sub1", "Sub2\nMarks", "Result"]),
                row(&["21CS001", "Jane Doe", "78", "85", "Pass"]),
            ],
            vec![row(&["21CS002", "John Roe", "64", "71", "Pass"])],
        ])
        .unwrap()
    }

    #[test]
    fn first_row_becomes_the_header() {
        let table = sample_table();
        assert_eq!(
            table.columns(),
            &["Roll No", "Name", "Sub1", "Sub2 Marks", "Result"]
        );
        assert_eq!(table.rows().len(), 2);
    }

    #[test]
    fn rows_are_concatenated_across_tables() {
        let table = sample_table();
        assert_eq!(table.rows()[1][0], "21CS002");
    }

    #[test]
    fn column_normalization_is_idempotent() {
        let once = normalize_column("Sub2\nMarks");
        assert_eq!(once, "Sub2 Marks");
        assert_eq!(normalize_column(&once), once);
    }

    #[test]
    fn no_rows_is_an_empty_document() {
        let err = NormalizedTable::from_tables(vec![]).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument));
    }

    #[test]
    fn width_mismatch_is_a_shape_error() {
        let err = NormalizedTable::from_tables(vec![vec![
            row(&["Roll No", "Name"]),
            row(&["21CS001", "Jane Doe", "78"]),
        ]])
        .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Shape {
                row: 0,
                expected: 2,
                actual: 3,
            }
        ));
    }

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let table = sample_table();
        assert!(
            table
                .find("21CS001", DuplicatePolicy::FirstMatch)
                .unwrap()
                .is_some()
        );
        assert!(
            table
                .find("21cs001", DuplicatePolicy::FirstMatch)
                .unwrap()
                .is_none()
        );
        assert!(
            table
                .find(" 21CS001", DuplicatePolicy::FirstMatch)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn missing_roll_no_is_not_found() {
        let table = sample_table();
        assert!(
            table
                .find("21CS999", DuplicatePolicy::FirstMatch)
                .unwrap()
                .is_none()
        );
    }

    fn duplicate_table() -> NormalizedTable {
        NormalizedTable::from_tables(vec![vec![
            row(&["Roll No", "Name"]),
            row(&["21CS001", "Jane Doe"]),
            row(&["21CS001", "J. Doe"]),
        ]])
        .unwrap()
    }

    #[test]
    fn first_match_policy_takes_the_earliest_duplicate() {
        let table = duplicate_table();
        let matched = table.find("21CS001", DuplicatePolicy::FirstMatch).unwrap();
        assert_eq!(matched.unwrap()[1], "Jane Doe");
    }

    #[test]
    fn error_policy_rejects_duplicates() {
        let table = duplicate_table();
        let err = table.find("21CS001", DuplicatePolicy::Error).unwrap_err();
        assert!(matches!(
            err,
            ExtractError::AmbiguousRollNo { matches: 2, .. }
        ));
    }

    #[test]
    fn record_relabels_the_roll_column_and_keeps_order() {
        let table = sample_table();
        let matched = table
            .find("21CS001", DuplicatePolicy::FirstMatch)
            .unwrap()
            .unwrap();
        let record = ResultRecord::from_row(table.columns(), matched);

        assert_eq!(record.fields()[0].0, ROLL_NO_KEY);
        assert_eq!(record.fields()[0].1, "21CS001");
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"Exam Roll No.":"21CS001","Name":"Jane Doe","Sub1":"78","Sub2 Marks":"85","Result":"Pass"}"#
        );
    }
}
