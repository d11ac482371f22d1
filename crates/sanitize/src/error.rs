// ABOUTME: Error types for document sanitization.
// ABOUTME: Provides SanitizeError with Io and Decode variants, both scoped to a single document.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while loading or persisting a document.
#[derive(Debug, Error)]
pub enum SanitizeError {
    /// The document could not be read or written.
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not valid UTF-8.
    #[error("failed to decode {path} as UTF-8: {reason}")]
    Decode { path: PathBuf, reason: String },
}

impl SanitizeError {
    /// Creates an Io error for the given path.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        SanitizeError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a Decode error for the given path.
    pub fn decode(path: impl AsRef<Path>, reason: impl std::fmt::Display) -> Self {
        SanitizeError::Decode {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Returns true if this is a Decode error.
    pub fn is_decode(&self) -> bool {
        matches!(self, SanitizeError::Decode { .. })
    }
}
