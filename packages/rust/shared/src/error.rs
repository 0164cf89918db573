//! Error types for linksorter.
//!
//! Library crates use [`LinkSorterError`] via `thiserror`.
//! The CLI wraps this with `color-eyre`; the HTTP layer maps each variant
//! to a status code and a JSON body.

use std::ops::Range;
use std::path::PathBuf;

/// Top-level error type for all linksorter operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkSorterError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Caller-supplied input was rejected (e.g. a URL not starting with `http`).
    #[error("{message}")]
    Validation { message: String },

    /// The page could not be fetched (network, status, content type, timeout).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The page was fetched but yielded no usable text.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// The language-model call failed or returned nothing usable.
    #[error("oracle error: {0}")]
    Oracle(String),

    /// A line of oracle output used a known verb but an unreadable payload.
    #[error("Invalid action format: {text}")]
    MalformedAction {
        /// The offending line, verbatim.
        text: String,
        /// 1-based line number within the oracle reply.
        line: usize,
        /// Byte span within `text` where parsing gave up.
        span: Range<usize>,
        /// Short machine-oriented reason.
        reason: &'static str,
    },

    /// HTTP server setup or runtime error.
    #[error("server error: {0}")]
    Server(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, LinkSorterError>;

impl LinkSorterError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
