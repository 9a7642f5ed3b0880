//! Error types for moira-api.

use thiserror::Error;

/// All errors that can arise while talking to the Moira API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or body-read failure.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The response body did not match the expected JSON shape.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// The server answered with a non-200 status.
    #[error("request to {url} complete with code {status}. {body}")]
    RemoteRejected {
        url: String,
        status: u16,
        body: String,
    },

    /// A request body could not be encoded.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// A local or remote object lacks a field reconciliation depends on.
    #[error("{0}")]
    Invalid(String),
}

impl ApiError {
    /// Status code of a rejected request, if that is what this error is.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
