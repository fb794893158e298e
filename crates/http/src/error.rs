//! Error handling for the pulse HTTP layer

use thiserror::Error;

/// Failures raised before a response status could be inspected
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid path segment '{segment}' for base {base}")]
    InvalidPath { base: String, segment: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("{method} {url} failed: {source}")]
    Transport {
        method: reqwest::Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Whether the failure happened below HTTP (connect, timeout, reset)
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
