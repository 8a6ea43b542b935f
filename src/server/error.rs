//! JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::error::ServiceError;

/// Machine-readable error codes returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    /// The request body or a parameter was rejected.
    InvalidArgument,
    /// The phrase does not exist.
    NotFound,
    /// No image backend produced a result.
    NoImage,
    /// An upstream image API failed.
    Upstream,
    /// Anything else.
    Internal,
}

/// A [`ServiceError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl ApiError {
    /// Status code and error code for the wrapped error.
    #[must_use]
    pub fn classify(&self) -> (StatusCode, ApiErrorCode) {
        match self.0 {
            ServiceError::InvalidArgument(_) => {
                (StatusCode::BAD_REQUEST, ApiErrorCode::InvalidArgument)
            }
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, ApiErrorCode::NotFound),
            ServiceError::NoImageAvailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, ApiErrorCode::NoImage)
            }
            ServiceError::Api { .. } | ServiceError::Network(_) => {
                (StatusCode::BAD_GATEWAY, ApiErrorCode::Upstream)
            }
            ServiceError::Io(_)
            | ServiceError::Config(_)
            | ServiceError::MissingApiKey { .. }
            | ServiceError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ApiErrorCode::Internal)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        // Internal details stay in the log.
        let message = if code == ApiErrorCode::Internal {
            "internal error".to_string()
        } else {
            self.0.to_string()
        };
        let body = json!({ "error": { "code": code, "message": message } });
        (status, Json(body)).into_response()
    }
}
