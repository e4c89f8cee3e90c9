//! Error types for the inventory core and its collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by dataset construction, filtering, aggregation, export
/// and the source/sink boundaries.
///
/// A source that returns zero rows is not an error: it produces an empty
/// dataset.
#[derive(Debug, Error)]
pub enum InventoryError {
    // === Dataset shape ===
    /// A filter or aggregation named a column the dataset does not have.
    #[error("column '{column}' not found in dataset")]
    InvalidColumn { column: String },

    /// Two headers share the same name after trimming.
    #[error("duplicate column name '{column}'")]
    DuplicateColumn { column: String },

    /// A data row has more cells than the header row.
    #[error("row {row} has {len} cells but the header has {expected}")]
    RowTooLong {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// A column does not have the same number of values as its siblings.
    #[error("column '{column}' has {len} values, expected {expected}")]
    ColumnLength {
        column: String,
        len: usize,
        expected: usize,
    },

    // === Collaborators ===
    /// The source loader could not produce raw rows.
    #[error("source {origin} unavailable: {message}")]
    SourceUnavailable { origin: String, message: String },

    /// The record sink rejected the row or could not be reached.
    #[error("record sink unavailable: {message}")]
    SinkUnavailable { message: String },

    /// The serializer could not produce a spreadsheet byte stream.
    #[error("export failed: {message}")]
    ExportFailure { message: String },

    /// The chart renderer failed.
    #[error("chart rendering failed: {message}")]
    Chart { message: String },

    // === Configuration ===
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl InventoryError {
    pub fn invalid_column(column: impl Into<String>) -> Self {
        Self::InvalidColumn {
            column: column.into(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for InventoryError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::ExportFailure {
            message: err.to_string(),
        }
    }
}

/// Result type for inventory operations.
pub type Result<T> = std::result::Result<T, InventoryError>;
