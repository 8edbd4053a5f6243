//! Unified error types for tgrab.
//!
//! This module provides a single [`TgrabError`] enum that covers all error
//! cases in the library.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Recoverable vs fatal** is explicit: [`TgrabError::is_recoverable`]
//!   distinguishes rate limiting and transient network failures (handled
//!   in-stream) from everything else (which terminates the run)

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for tgrab operations.
pub type Result<T> = std::result::Result<T, TgrabError>;

/// The error type for all tgrab operations.
///
/// Each variant contains context about what went wrong and, where
/// applicable, the underlying source error.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TgrabError {
    /// Missing or invalid configuration.
    ///
    /// Raised before any network or file activity: absent credentials,
    /// a malformed peer identifier, an inverted date range.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The stored session is missing, invalid, or expired.
    ///
    /// The operator must re-run the bootstrap flow (`tgrab auth`).
    #[error("Session not authorized{}: run `tgrab auth` first", path.as_ref().map(|p| format!(" ({})", p.display())).unwrap_or_default())]
    Auth {
        /// The session artifact path, if one was consulted
        path: Option<PathBuf>,
    },

    /// The export target does not exist or is not accessible.
    #[error("Target not found: {0}")]
    NotFound(String),

    /// The platform asked the caller to wait before retrying.
    ///
    /// Recoverable: the record stream sleeps the requested interval and
    /// re-issues the same page request.
    #[error("Rate limited: platform requested a {seconds}s wait")]
    RateLimited {
        /// Wait duration requested by the platform, in seconds
        seconds: u64,
    },

    /// A transient network failure.
    ///
    /// Retried with bounded backoff; becomes fatal once `attempts`
    /// reaches the configured retry limit.
    #[error("Network error after {attempts} attempt(s): {message}")]
    Network {
        /// How many attempts were made before giving up
        attempts: u32,
        /// Description of the underlying failure
        message: String,
    },

    /// Invalid date in a range bound. Expects `YYYY-MM-DD`.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// Invalid peer identifier.
    #[error("Invalid peer id '{0}': expected a signed numeric identifier")]
    InvalidPeer(String),

    /// A row's field count doesn't match its header.
    #[error("Row has {actual} field(s), header has {expected}")]
    RowShape {
        /// Field count declared by the header
        expected: usize,
        /// Field count of the offending row
        actual: usize,
    },

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing/serialization error (archive files, session artifact).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The archive file doesn't match the expected structure.
    #[error("Invalid archive{}: {message}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    InvalidArchive {
        /// Description of what's wrong
        message: String,
        /// The file path, if available
        path: Option<PathBuf>,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl TgrabError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        TgrabError::Config(message.into())
    }

    /// Creates an auth error referencing the session artifact.
    pub fn auth(path: Option<PathBuf>) -> Self {
        TgrabError::Auth { path }
    }

    /// Creates a not-found error for a target.
    pub fn not_found(target: impl Into<String>) -> Self {
        TgrabError::NotFound(target.into())
    }

    /// Creates a rate-limit signal with the platform-requested wait.
    pub fn rate_limited(seconds: u64) -> Self {
        TgrabError::RateLimited { seconds }
    }

    /// Creates a transient network error.
    pub fn network(attempts: u32, message: impl Into<String>) -> Self {
        TgrabError::Network {
            attempts,
            message: message.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        TgrabError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Creates an invalid archive error.
    pub fn invalid_archive(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        TgrabError::InvalidArchive {
            message: message.into(),
            path,
        }
    }

    /// Returns `true` if the pipeline may retry after this error.
    ///
    /// Rate limiting and transient network failures are recoverable;
    /// everything else terminates the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            TgrabError::RateLimited { .. } | TgrabError::Network { .. }
        )
    }

    /// Returns `true` if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, TgrabError::Config(_))
    }

    /// Returns `true` if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TgrabError::NotFound(_))
    }

    /// Returns `true` if this is a rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, TgrabError::RateLimited { .. })
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, TgrabError::Io(_))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = TgrabError::config("TG_API_ID is not set");
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("TG_API_ID"));
    }

    #[test]
    fn test_auth_error_display() {
        let err = TgrabError::auth(Some(PathBuf::from("/tmp/session.json")));
        let display = err.to_string();
        assert!(display.contains("tgrab auth"));
        assert!(display.contains("/tmp/session.json"));

        let bare = TgrabError::auth(None);
        assert!(!bare.to_string().contains('('));
    }

    #[test]
    fn test_rate_limited_display() {
        let err = TgrabError::rate_limited(42);
        assert!(err.to_string().contains("42s"));
    }

    #[test]
    fn test_network_display() {
        let err = TgrabError::network(3, "connection reset");
        let display = err.to_string();
        assert!(display.contains("3 attempt"));
        assert!(display.contains("connection reset"));
    }

    #[test]
    fn test_invalid_date_display() {
        let err = TgrabError::invalid_date("not-a-date");
        let display = err.to_string();
        assert!(display.contains("not-a-date"));
        assert!(display.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_invalid_archive_with_path() {
        let err = TgrabError::invalid_archive(
            "missing 'messages' array",
            Some(PathBuf::from("/data/dump.json")),
        );
        let display = err.to_string();
        assert!(display.contains("missing 'messages' array"));
        assert!(display.contains("/data/dump.json"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(TgrabError::rate_limited(5).is_recoverable());
        assert!(TgrabError::network(1, "timeout").is_recoverable());
        assert!(!TgrabError::config("bad").is_recoverable());
        assert!(!TgrabError::not_found("peer -1").is_recoverable());
        assert!(!TgrabError::Io(io::Error::new(io::ErrorKind::NotFound, "gone")).is_recoverable());
    }

    #[test]
    fn test_is_methods() {
        let config = TgrabError::config("x");
        assert!(config.is_config());
        assert!(!config.is_not_found());
        assert!(!config.is_rate_limited());

        let nf = TgrabError::not_found("peer");
        assert!(nf.is_not_found());
        assert!(!nf.is_io());

        let io_err = TgrabError::Io(io::Error::new(io::ErrorKind::NotFound, ""));
        assert!(io_err.is_io());
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = TgrabError::from(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: TgrabError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }
}
