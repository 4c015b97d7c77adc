//! Error types for page sources and paginated fetches.

use serde_json::Value;
use thiserror::Error;

/// Result type for a single page request.
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors a page source can report for one request.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source asked us to back off (HTTP 429)
    #[error("rate limited")]
    RateLimited,

    /// Non-success status other than rate limiting
    #[error("API returned error: {status} - {body}")]
    Status { status: u16, body: String },

    /// The per-call timeout elapsed
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or other transport failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The body was not the shape we expected
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Malformed(err.to_string())
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

/// A paginated fetch aborted on a non-retryable error.
///
/// Carries the items gathered before the failure so callers can decide
/// whether partial data is usable.
#[derive(Debug, Error)]
#[error("fetch failed after {} items: {source}", .partial.len())]
pub struct FetchFailed {
    pub partial: Vec<Value>,
    pub source: SourceError,
}
