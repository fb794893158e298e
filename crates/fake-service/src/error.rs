//! Error handling for the fake service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Errors a handler can answer with
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("bad request: {message}")]
    BadRequest {
        /// Field name to list of complaints
        fields: Map<String, Value>,
        message: String,
    },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    /// Create a field validation error
    pub fn field(field: &str, complaint: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(field.to_string(), json!([complaint.into()]));
        Self::BadRequest {
            fields,
            message: format!("invalid field '{field}'"),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ServiceError::BadRequest { fields, .. } => {
                (StatusCode::BAD_REQUEST, Value::Object(fields))
            }
            ServiceError::NotFound { message } => {
                (StatusCode::NOT_FOUND, json!({ "detail": message }))
            }
            ServiceError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": e.to_string() }),
            ),
        };

        tracing::debug!(status_code = %status.as_u16(), "fake service error");

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_maps_to_bad_request() {
        let response = ServiceError::field("title", "This field may not be blank.").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = ServiceError::not_found("Not found.").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_maps_to_500() {
        let response = ServiceError::Internal(anyhow::anyhow!("store poisoned")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
