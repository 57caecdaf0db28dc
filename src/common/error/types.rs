//! Unified error types for pitaya operations.
//!
//! Three failure kinds drive the engine: `Format` (signature/content does not
//! match a given format, non-fatal, used by the sniffing loop), `Parse`
//! (structurally invalid content once a format is committed to, fatal for that
//! load) and `Io`. Translation degradations are not errors at all; they are
//! collected as [`TranslationWarning`](crate::model::translate::TranslationWarning)
//! values alongside a successful result.
use thiserror::Error;

/// Main error type for pitaya operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Signature or content does not match the format being tried.
    ///
    /// Non-fatal: the format dispatcher moves on to the next candidate.
    #[error("Unrecognized format: {0}")]
    Format(String),

    /// Structurally invalid content in a committed format.
    ///
    /// Fatal for the load; no partial document is returned.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The operation was cancelled through a shared cancel flag.
    #[error("Operation cancelled")]
    Cancelled,
}

impl Error {
    /// True when this error merely means "try the next format".
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Error::Format(_))
    }
}

/// Result type for pitaya operations.
pub type Result<T> = std::result::Result<T, Error>;
