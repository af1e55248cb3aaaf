use thiserror::Error;

use crate::transform::TransformError;

#[derive(Error, Debug)]
pub enum CleaningError {
    #[error("schema resolution failed for {field}: {reason}")]
    SchemaResolution { field: &'static str, reason: String },

    #[error("column '{column}' row {row_index}: cannot convert '{value}' to a number")]
    UnitConversion {
        column: String,
        row_index: usize,
        value: String,
    },

    #[error("invalid configuration: {message}")]
    Configuration { message: String },

    #[error("geometry count {points} does not match record count {records}")]
    GeometryMismatch { records: usize, points: usize },

    #[error("coordinate transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, CleaningError>;
