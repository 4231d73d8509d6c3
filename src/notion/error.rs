//! Errors raised while talking to the content source

use thiserror::Error;

/// Failure retrieving content from the upstream workspace
#[derive(Debug, Error)]
pub enum ContentError {
    /// No credentials configured; callers degrade to empty results
    #[error("content source is not configured")]
    Unavailable,

    /// Credentials were required but one of them is missing
    #[error("{0} is not set in environment variables")]
    MissingCredential(&'static str),

    #[error("request to content source failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("content source returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("unexpected response from content source: {0}")]
    Decode(#[from] serde_json::Error),
}
