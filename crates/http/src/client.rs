//! Thin `reqwest` wrapper speaking the collection/item URL scheme.

use std::fmt::Display;
use std::time::Duration;

use pulse_kernel::settings::TargetSettings;
use pulse_kernel::Record;
use reqwest::{Method, StatusCode};
use url::Url;

use crate::error::ClientError;
use crate::form::form_pairs;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub url: Url,
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, ClientError> {
        serde_json::from_str(&self.body).map_err(|source| ClientError::Decode {
            url: self.url.to_string(),
            source,
        })
    }

    /// Body truncated for error messages.
    pub fn excerpt(&self) -> String {
        const LIMIT: usize = 200;
        match self.body.char_indices().nth(LIMIT) {
            Some((cut, _)) => format!("{}...", &self.body[..cut]),
            None => self.body.clone(),
        }
    }
}

/// Client for one service under test.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Build a client for `target.base_url`.
    pub fn new(target: &TargetSettings) -> Result<Self, ClientError> {
        let mut base =
            Url::parse(&target.base_url).map_err(|source| ClientError::InvalidBaseUrl {
                url: target.base_url.clone(),
                source,
            })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidPath {
                base: target.base_url.clone(),
                segment: String::new(),
            });
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = reqwest::Client::builder().user_agent(concat!(
            "pulse-conformance/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout_ms) = target.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self { http, base })
    }

    /// Base URL every path is resolved against (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `{base}/{collection}/`
    pub fn collection_url(&self, collection: &str) -> Result<Url, ClientError> {
        self.join(&format!("{collection}/"))
    }

    /// `{base}/{collection}/{id}`
    pub fn item_url(&self, collection: &str, id: impl Display) -> Result<Url, ClientError> {
        self.join(&format!("{collection}/{id}"))
    }

    fn join(&self, segment: &str) -> Result<Url, ClientError> {
        self.base
            .join(segment)
            .map_err(|_| ClientError::InvalidPath {
                base: self.base.to_string(),
                segment: segment.to_string(),
            })
    }

    /// POST a form payload to the collection URL.
    pub async fn create(
        &self,
        collection: &str,
        payload: &Record,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.collection_url(collection)?;
        self.send(Method::POST, url, Some(payload)).await
    }

    /// GET one record.
    pub async fn read(&self, collection: &str, id: impl Display) -> Result<ApiResponse, ClientError> {
        let url = self.item_url(collection, id)?;
        self.send(Method::GET, url, None).await
    }

    /// PUT a partial form payload to the item URL.
    pub async fn update(
        &self,
        collection: &str,
        id: impl Display,
        payload: &Record,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.item_url(collection, id)?;
        self.send(Method::PUT, url, Some(payload)).await
    }

    /// DELETE one record.
    pub async fn delete(
        &self,
        collection: &str,
        id: impl Display,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.item_url(collection, id)?;
        self.send(Method::DELETE, url, None).await
    }

    /// GET the collection listing.
    pub async fn list(&self, collection: &str) -> Result<ApiResponse, ClientError> {
        let url = self.collection_url(collection)?;
        self.send(Method::GET, url, None).await
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        payload: Option<&Record>,
    ) -> Result<ApiResponse, ClientError> {
        let mut request = self.http.request(method.clone(), url.clone());
        if let Some(payload) = payload {
            request = request.form(&form_pairs(payload));
        }

        let transport = |source| ClientError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        };

        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        tracing::debug!(
            method = %method,
            url = %url,
            status = status.as_u16(),
            "request complete"
        );

        Ok(ApiResponse {
            method,
            url,
            status,
            body,
        })
    }
}
