//! Query API error and response types

use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use storyhunt_core::GatewayError;
use tracing::error;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Optional error details
    pub details: Option<String>,
}

/// HTTP wrapper around [`GatewayError`]
#[derive(Debug)]
pub struct ApiError(pub GatewayError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            GatewayError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Backend { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Config { .. }
            | GatewayError::Serialization { .. }
            | GatewayError::Network { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(GatewayError::validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            GatewayError::Validation { message } => ErrorResponse {
                error: "Invalid request".to_string(),
                details: Some(message),
            },
            GatewayError::BackendUnavailable { .. } => ErrorResponse {
                error: "Search backend unavailable".to_string(),
                details: None,
            },
            GatewayError::Backend { .. } => ErrorResponse {
                error: "Search backend error".to_string(),
                details: None,
            },
            GatewayError::Timeout { .. } => ErrorResponse {
                error: "Search backend timed out".to_string(),
                details: None,
            },
            other => {
                error!("Internal error while serving request: {}", other);
                ErrorResponse {
                    error: "Internal server error".to_string(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
