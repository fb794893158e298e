//! HTTP client facade for pulse conformance runs: URL composition, form
//! encoding and transport error mapping over `reqwest`.

pub mod client;
pub mod error;
pub mod form;

pub use client::{ApiClient, ApiResponse};
pub use error::ClientError;
pub use reqwest::{Method, StatusCode};
pub use url::Url;
