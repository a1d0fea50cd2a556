//! Error types for schema conversion

use thiserror::Error;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Conversion errors
///
/// Odd or underspecified schemas are never errors: the rewrite rules fall back
/// to a permissive schema instead. Only broken internal invariants and invalid
/// arguments at the API edge surface here.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("Cannot close cycle: no value at path '{path}'")]
    CyclePathNotFound { path: String },

    #[error("Cycle through node {node} survived extraction")]
    UnresolvedCycle { node: usize },

    #[error("Invalid component name: {0:?}")]
    InvalidName(String),

    #[error("Root schema must be an object or a boolean, got {0}")]
    InvalidRoot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
