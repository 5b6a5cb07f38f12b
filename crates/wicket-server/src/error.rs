//! Error types for the gateway server.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Gateway error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Admin authentication failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Admin authenticated but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Talking to the provider failed.
    #[error("Bad gateway: {0}")]
    BadGateway(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<wicket_proxy::ProxyError> for ServerError {
    fn from(e: wicket_proxy::ProxyError) -> Self {
        match e {
            wicket_proxy::ProxyError::InvalidTarget { .. } => ServerError::Config(e.to_string()),
            _ => ServerError::BadGateway(e.to_string()),
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            // Upstream failures keep the fixed plain-text body: internal
            // error text must not reach the client.
            ServerError::BadGateway(cause) => {
                tracing::error!(error = %cause, "upstream failure");
                return wicket_proxy::bad_gateway();
            }
            ServerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ServerError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        let message = self.to_string();

        match &self {
            ServerError::Internal(_) | ServerError::Config(_) => {
                tracing::error!(status = %status, code, error = %message, "Server error");
            }
            _ => {
                tracing::warn!(status = %status, code, error = %message, "Client error");
            }
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bad_gateway_body_is_fixed() {
        let response =
            ServerError::BadGateway("connection refused to 10.0.0.1:4444".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body.as_ref(), wicket_proxy::BAD_GATEWAY_BODY.as_bytes());
    }

    #[test]
    fn test_proxy_error_mapping() {
        let err: ServerError = wicket_proxy::ProxyError::Upstream("refused".to_string()).into();
        assert!(matches!(err, ServerError::BadGateway(_)));

        let err: ServerError = wicket_proxy::ProxyError::InvalidTarget {
            url: "nope".to_string(),
            reason: "missing scheme".to_string(),
        }
        .into();
        assert!(matches!(err, ServerError::Config(_)));
    }
}
