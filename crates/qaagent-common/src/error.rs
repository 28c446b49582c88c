//! Error taxonomy shared by every qaagent crate.
//!
//! The kinds mirror the taxonomy in the platform's error-handling design:
//! `NotFound`, `ValidationError`, `ToolUnavailable`, `ToolFailure`,
//! `ParseError`, and `IOError`. Each kind maps to a CLI exit code and an HTTP
//! status so the CLI and API crates can translate a single error type
//! without re-deriving the mapping at every call site.

use std::fmt;

/// Coarse classification of an error, independent of where it surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced run or resource does not exist.
    NotFound,
    /// A value was out of its declared range, or an id/prefix was malformed.
    ValidationError,
    /// An external tool binary is missing or its presence probe timed out.
    ToolUnavailable,
    /// An external tool exited with an unexpected, non-"findings" status.
    ToolFailure,
    /// Tool output or a JSONL line could not be parsed.
    ParseError,
    /// A filesystem operation against the run directory failed.
    IOError,
}

impl ErrorKind {
    /// CLI exit code per the external-interfaces contract: 0 success, 2
    /// usage/validation error, 1 unexpected error.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::NotFound | ErrorKind::ValidationError => 2,
            ErrorKind::ToolUnavailable | ErrorKind::ToolFailure | ErrorKind::ParseError => 1,
            ErrorKind::IOError => 1,
        }
    }

    /// HTTP status code for API responses.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::ValidationError => 400,
            ErrorKind::ToolUnavailable | ErrorKind::ToolFailure | ErrorKind::ParseError => 200,
            ErrorKind::IOError => 500,
        }
    }
}

/// The shared error type. Carries a kind plus a human-readable message so
/// call sites can both classify and display the failure.
#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    pub fn tool_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolUnavailable, message)
    }

    pub fn tool_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ToolFailure, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParseError, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IOError, message)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::parse(err.to_string())
    }
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_the_usage_vs_unexpected_split() {
        assert_eq!(ErrorKind::NotFound.exit_code(), 2);
        assert_eq!(ErrorKind::ValidationError.exit_code(), 2);
        assert_eq!(ErrorKind::IOError.exit_code(), 1);
    }

    #[test]
    fn not_found_maps_to_http_404() {
        assert_eq!(ErrorKind::NotFound.http_status(), 404);
    }
}
