use std::fs;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use polars::prelude::*;

use crate::errors::ReadError;

/// Pick a field delimiter from the file extension. Probe exports are
/// comma-delimited (`.dat`, `.csv`); `.tsv`/`.txt` dumps use tabs.
pub fn delimiter_for_path(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("txt") => b'\t',
        _ => b',',
    }
}

/// Read a raw probe export into a table of string columns.
///
/// The first `header_rows` lines are environment/metadata lines, the line at
/// index `header_rows` names the columns, and the following `junk_rows` lines
/// (units, aggregation codes) are dropped. Everything after that is data.
pub fn read_delimited(
    path: impl AsRef<Path>,
    header_rows: usize,
    junk_rows: usize,
) -> Result<DataFrame, ReadError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_delimited_str(&content, delimiter_for_path(path), header_rows, junk_rows)
}

/// Same as [`read_delimited`], operating on in-memory content.
pub fn read_delimited_str(
    content: &str,
    delimiter: u8,
    header_rows: usize,
    junk_rows: usize,
) -> Result<DataFrame, ReadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows: Vec<StringRecord> = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }

    let header = rows.get(header_rows).ok_or(ReadError::MissingHeader {
        row_index: header_rows,
        total_rows: rows.len(),
    })?;
    let names: Vec<String> = header.iter().map(|name| name.trim().to_string()).collect();
    let width = names.len();

    let data_start = header_rows + 1 + junk_rows;
    if data_start >= rows.len() {
        return Err(ReadError::EmptyData);
    }

    let mut columns: Vec<Vec<String>> = (0..width)
        .map(|_| Vec::with_capacity(rows.len() - data_start))
        .collect();
    for (line_index, row) in rows.iter().enumerate().skip(data_start) {
        if row.len() != width {
            return Err(ReadError::RaggedRow {
                line_index,
                expected: width,
                found: row.len(),
            });
        }
        for (column, cell) in columns.iter_mut().zip(row.iter()) {
            column.push(cell.trim().to_string());
        }
    }

    let series: Vec<Column> = names
        .into_iter()
        .zip(columns)
        .map(|(name, values)| Series::new(name.into(), values).into())
        .collect();

    Ok(DataFrame::new(series)?)
}
