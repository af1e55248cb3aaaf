use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("header row {row_index} missing: file has only {total_rows} rows")]
    MissingHeader { row_index: usize, total_rows: usize },

    #[error("data row {line_index} has {found} fields, expected {expected}")]
    RaggedRow {
        line_index: usize,
        expected: usize,
        found: usize,
    },

    #[error("file did not contain any data rows")]
    EmptyData,

    #[error("failed to assemble raw table: {0}")]
    Table(#[from] polars::error::PolarsError),
}
