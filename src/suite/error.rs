//! Failure taxonomy for conformance cases

use pulse_http::{ClientError, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Why a case failed
#[derive(Error, Debug)]
pub enum ConformanceError {
    #[error("{method} {url}: expected status {expected}, got {actual} (body: {body})")]
    UnexpectedStatus {
        method: Method,
        url: String,
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },

    #[error("{method} {url}: body mismatch, expected {expected}, got {actual}")]
    BodyMismatch {
        method: Method,
        url: String,
        expected: Value,
        actual: Value,
    },

    #[error("{url}: response is not a valid {resource} record: {source}")]
    Shape {
        resource: &'static str,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{url}: listing is not a JSON array")]
    NotAList { url: String },

    #[error("{url}: created record carries no integer id")]
    MissingId { url: String },

    #[error("{resource} record {id} still listed after delete")]
    StillListed { resource: &'static str, id: u64 },

    #[error("rejected {resource} payload was persisted anyway as id(s) {ids:?}")]
    PersistedAfterRejection { resource: &'static str, ids: Vec<u64> },

    #[error("fixture setup failed: {0}")]
    Fixture(#[source] Box<ConformanceError>),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ConformanceError {
    /// Whether the failure came from the network rather than the service's answer
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Client(err) => err.is_transport(),
            Self::Fixture(inner) => inner.is_transport(),
            _ => false,
        }
    }
}
