//! Error types for jotdb
//!
//! Provides a unified error type for all operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using JotError
pub type Result<T> = std::result::Result<T, JotError>;

/// Unified error type for jotdb operations
#[derive(Debug, Error)]
pub enum JotError {
    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("failed to encode document {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("document is not a JSON object")]
    InvalidDocument,

    // -------------------------------------------------------------------------
    // Flush Errors
    // -------------------------------------------------------------------------
    #[error("flush failed: {0}")]
    Flush(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Lifecycle Errors
    // -------------------------------------------------------------------------
    #[error("database is closed")]
    Closed,
}
