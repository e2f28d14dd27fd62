//! Error types for rule catalog construction

use thiserror::Error;

/// Errors raised while building or loading a [`RuleCatalog`](crate::RuleCatalog).
///
/// Classification never fails; only catalogs can be malformed.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Rule catalog is empty")]
    Empty,

    #[error("Duplicate rule name: {0}")]
    DuplicateName(String),

    #[error("Rule '{rule}' has an empty {field} fragment")]
    EmptyFragment { rule: String, field: &'static str },

    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error reading catalog: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
