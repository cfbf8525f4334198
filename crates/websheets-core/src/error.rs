//! Error types for Websheets core.

use thiserror::Error;

use websheets_engine::engine::{CellRef, GenerationError};

/// Errors returned by sheet operations.
///
/// Formula failures are not errors at this level; they are displayed in the
/// cell as sentinels.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebsheetsError {
    #[error("Row {row} is out of bounds (sheet has {rows} rows)")]
    RowOutOfBounds { row: usize, rows: usize },

    #[error("Column {col} is out of bounds (sheet has {cols} columns)")]
    ColumnOutOfBounds { col: usize, cols: usize },

    #[error("Cell {0} is out of bounds")]
    CellOutOfBounds(CellRef),

    #[error("No cell selected")]
    NoSelection,

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),
}

pub type Result<T> = std::result::Result<T, WebsheetsError>;
