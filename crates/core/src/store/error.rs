//! Error types for the store module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or saving a document.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The document exists but could not be read.
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document exists but is not valid JSON for its schema.
    #[error("Corrupt document at {path}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The document could not be serialized.
    #[error("Failed to encode document for {path}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The replacement file could not be written or moved into place.
    #[error("Failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    /// Path of the document the error refers to.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. }
            | Self::Corrupt { path, .. }
            | Self::Encode { path, .. }
            | Self::Write { path, .. } => path,
        }
    }
}
