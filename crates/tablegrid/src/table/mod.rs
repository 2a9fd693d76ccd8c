//! Table assembly and export.
//!
//! Turns row-major cell texts into rows, and renders rows as Markdown or CSV.

use std::path::Path;

use crate::types::Table;
use crate::{Result, TableGridError};

/// Split row-major cell texts into rows of `columns` cells.
///
/// A trailing partial row is kept as is. `columns == 0` yields no rows.
pub fn assemble_rows(texts: Vec<String>, columns: usize) -> Vec<Vec<String>> {
    if columns == 0 {
        return Vec::new();
    }

    let mut rows = Vec::with_capacity(texts.len().div_ceil(columns));
    let mut iter = texts.into_iter().peekable();
    while iter.peek().is_some() {
        rows.push(iter.by_ref().take(columns).collect());
    }
    rows
}

/// Build a [`Table`] from rows, rendering its Markdown form.
pub fn build_table(rows: Vec<Vec<String>>) -> Table {
    let markdown = table_to_markdown(&rows);
    Table { cells: rows, markdown }
}

/// Render rows as a Markdown table. The first row is the header.
///
/// Rows shorter than the widest row are padded with empty cells. Pipes are
/// escaped and line breaks inside a cell become spaces.
pub fn table_to_markdown(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    for (index, row) in rows.iter().enumerate() {
        out.push('|');
        for col in 0..width {
            let text = row.get(col).map(String::as_str).unwrap_or("");
            out.push(' ');
            out.push_str(&escape_markdown_cell(text));
            out.push_str(" |");
        }
        out.push('\n');

        if index == 0 {
            out.push('|');
            for _ in 0..width {
                out.push_str(" --- |");
            }
            out.push('\n');
        }
    }
    out
}

fn escape_markdown_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Serialize rows as CSV.
pub fn rows_to_csv(rows: &[Vec<String>]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    for row in rows {
        writer.write_record(row)?;
    }
    finish_csv(writer)
}

/// Serialize page text as single-column CSV, one record per line.
pub fn text_to_csv(text: &str) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for line in text.lines() {
        writer.write_record([line])?;
    }
    finish_csv(writer)
}

/// Write rows as CSV to `path`.
pub fn write_csv(path: impl AsRef<Path>, rows: &[Vec<String>]) -> Result<()> {
    let csv = rows_to_csv(rows)?;
    std::fs::write(path.as_ref(), csv)?;
    Ok(())
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| TableGridError::serialization(format!("Failed to flush CSV: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| TableGridError::serialization_with_source("CSV output is not UTF-8", e))
}
