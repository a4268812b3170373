//! Splitting extracted page text into tables of cell rows.
//!
//! A page may carry more than one table: blocks of consecutive non-empty
//! lines, separated by blank lines, are collected as distinct tables in
//! reading order.

use std::sync::LazyLock;

use regex::Regex;

use crate::TableLayout;
use crate::table::RawTable;

/// Matches the gap between two cells in whitespace-aligned table text.
static CELL_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(" {2,}").expect("cell gap pattern is valid"));

/// Splits one page's text into tables.
///
/// Each non-empty line becomes a cell row via `layout`; a blank line
/// closes the current table. A page with no table content yields an
/// empty vec.
#[must_use]
pub fn split_tables(text: &str, layout: &TableLayout) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current: RawTable = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                tables.push(std::mem::take(&mut current));
            }
            continue;
        }
        current.push(split_cells(line, layout));
    }
    if !current.is_empty() {
        tables.push(current);
    }

    tables
}

/// Splits a single line of table text into cell values.
#[must_use]
pub fn split_cells(line: &str, layout: &TableLayout) -> Vec<String> {
    match layout {
        TableLayout::WhitespaceGap => CELL_GAP
            .split(line.trim())
            .filter(|cell| !cell.is_empty())
            .map(str::to_owned)
            .collect(),
        TableLayout::Delimited { delimiter } => line
            .split(delimiter.as_str())
            .map(|cell| cell.trim().to_owned())
            .collect(),
    }
}
