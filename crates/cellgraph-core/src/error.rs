//! Error types for Cellgraph core.

use thiserror::Error;

/// Errors that can occur when loading, saving or editing a document.
#[derive(Error, Debug)]
pub enum CellgraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid cell reference: {0}")]
    InvalidCellRef(String),

    #[error("No file path set")]
    NoFilePath,
}

pub type Result<T> = std::result::Result<T, CellgraphError>;
