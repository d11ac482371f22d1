// ABOUTME: Error types for asset localization including ErrorCode enum and LocalizeError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of localization failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Status,
    Empty,
    Io,
    Decode,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Status => "unexpected HTTP status",
            ErrorCode::Empty => "empty response",
            ErrorCode::Io => "io error",
            ErrorCode::Decode => "decode error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for fetch and rewrite operations.
///
/// `target` is the URL or filesystem path the operation was working on.
#[derive(Debug, thiserror::Error)]
pub struct LocalizeError {
    pub code: ErrorCode,
    pub target: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for LocalizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.op, self.target, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl LocalizeError {
    fn new(
        code: ErrorCode,
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            target: target.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, target, op, source)
    }

    /// Create a Fetch error (transport failure).
    pub fn fetch(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, target, op, source)
    }

    /// Create a Status error for a non-success HTTP status.
    pub fn status(target: impl Into<String>, op: impl Into<String>, status: u16) -> Self {
        Self::new(
            ErrorCode::Status,
            target,
            op,
            Some(anyhow::anyhow!("HTTP status {}", status)),
        )
    }

    /// Create an Empty error for a zero-byte download.
    pub fn empty(target: impl Into<String>, op: impl Into<String>) -> Self {
        Self::new(ErrorCode::Empty, target, op, None)
    }

    /// Create an Io error.
    pub fn io(target: impl Into<String>, op: impl Into<String>, err: std::io::Error) -> Self {
        Self::new(ErrorCode::Io, target, op, Some(anyhow::Error::new(err)))
    }

    /// Create a Decode error.
    pub fn decode(
        target: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Decode, target, op, source)
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is a Status error.
    pub fn is_status(&self) -> bool {
        self.code == ErrorCode::Status
    }

    /// Returns true if this is an Empty error.
    pub fn is_empty(&self) -> bool {
        self.code == ErrorCode::Empty
    }

    /// Returns true if this is a Decode error.
    pub fn is_decode(&self) -> bool {
        self.code == ErrorCode::Decode
    }
}
