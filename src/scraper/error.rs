//! Shared error type for the MeioNovel adapter and its HTTP client.

use thiserror::Error;

/// Boxed transport error. `reqwest::Error` in production; anything in tests.
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Hard failures of an extraction operation.
///
/// Only fetches without a fallback surface these to the caller. Fallback steps
/// turn them into [`EmptyReason::Transport`](crate::scraper::EmptyReason) and move on.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Network error: could not reach {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus {
        status: u16,
        url: String,
        /// Optional context (e.g. "detail page", "chapter list") for programmatic use.
        context: Option<String>,
    },

    #[error("Failed to read response body from {url}: {source}")]
    BodyRead {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("Invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
}

impl ScraperError {
    /// True for failures of the transport itself (no HTTP status was obtained).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ScraperError::Network { .. } | ScraperError::BodyRead { .. }
        )
    }
}
