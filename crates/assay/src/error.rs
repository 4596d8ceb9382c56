//! Error types for the Assay library.

use thiserror::Error;

/// Main error type for Assay operations.
#[derive(Debug, Error)]
pub enum AssayError {
    /// Input produced a schema with no discoverable fields.
    #[error("empty schema: {0}")]
    EmptySchema(String),

    /// A schema was generated but no canonical structure matched it.
    #[error("unclassifiable structure: {0}")]
    Unclassifiable(String),

    /// A mapped source path could not be resolved against the raw payload.
    #[error("path resolution failed at '{path}': {message}")]
    PathResolution { path: String, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for Assay operations.
pub type Result<T> = std::result::Result<T, AssayError>;
