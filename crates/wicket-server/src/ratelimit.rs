//! Rate limiting middleware using governor.
//!
//! Flow routes get a general limiter; credential-submission routes (login
//! and 2FA POSTs) sit behind a stricter one on top of it. Limiters live in
//! [`AppState`] so nothing is read through process globals.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    state::{InMemoryState, NotKeyed},
};
use serde::Serialize;

use crate::config::GatewayConfig;
use crate::state::AppState;

/// Rate limiter type alias (uses default clock).
pub type SharedRateLimiter =
    Arc<RateLimiter<NotKeyed, InMemoryState, governor::clock::DefaultClock>>;

/// The gateway's two limiters.
pub struct RateLimiters {
    /// General flow-endpoint limiter.
    pub api: SharedRateLimiter,
    /// Stricter limiter for credential submissions.
    pub critical: SharedRateLimiter,
}

impl RateLimiters {
    pub fn new(config: &GatewayConfig) -> Self {
        Self {
            api: create_rate_limiter(config.api_rpm),
            critical: create_rate_limiter(config.critical_rpm),
        }
    }
}

/// Rate limit error response.
#[derive(Debug, Serialize)]
struct RateLimitError {
    error: String,
    code: u16,
    retry_after_seconds: Option<u64>,
}

/// Create a rate limiter with the specified requests per minute.
pub fn create_rate_limiter(requests_per_minute: u32) -> SharedRateLimiter {
    let quota = Quota::per_minute(
        NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::new(60).unwrap()),
    );
    Arc::new(RateLimiter::direct(quota))
}

/// General rate limiting middleware for flow endpoints.
pub async fn api_rate_limit(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limiter = state.limiters.api.clone();
    check_limit(&state, &limiter, request, next).await
}

/// Stricter rate limiting middleware for credential-submission endpoints.
pub async fn critical_rate_limit(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let limiter = state.limiters.critical.clone();
    check_limit(&state, &limiter, request, next).await
}

async fn check_limit(
    state: &AppState,
    limiter: &SharedRateLimiter,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.rate_limiting {
        return next.run(request).await;
    }

    match limiter.check() {
        Ok(_) => next.run(request).await,
        Err(_not_until) => {
            let retry_after = 1u64;

            tracing::warn!(
                path = %request.uri().path(),
                retry_after_seconds = retry_after,
                "Rate limit exceeded"
            );

            let error = RateLimitError {
                error: "Rate limit exceeded".to_string(),
                code: 429,
                retry_after_seconds: Some(retry_after),
            };

            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_after.to_string())],
                axum::Json(error),
            )
                .into_response()
        }
    }
}

/// Structured request logging middleware.
///
/// Logs method, path, status, and duration for every completed request.
pub async fn request_logging_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.config.request_logging {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed with client error"
        );
    } else {
        tracing::info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %duration.as_millis(),
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::{Router, middleware, routing::get};
    use tower::ServiceExt;

    async fn test_handler() -> &'static str {
        "ok"
    }

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/test", get(test_handler))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                api_rate_limit,
            ))
            .with_state(state)
    }

    #[tokio::test]
    async fn test_rate_limit_disabled() {
        let state = test_state(|c| c.with_rate_limiting(false));
        let app = test_router(state);

        for _ in 0..10 {
            let response = app
                .clone()
                .oneshot(
                    axum::http::Request::builder()
                        .uri("/test")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_rate_limit_allows_then_rejects() {
        let state = test_state(|c| c.with_api_rpm(2));
        let app = test_router(state);

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    axum::http::Request::builder()
                        .uri("/test")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/test")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "1");
    }

    #[test]
    fn test_create_rate_limiter() {
        let limiter = create_rate_limiter(60);
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_zero_rpm_falls_back() {
        let limiter = create_rate_limiter(0);
        assert!(limiter.check().is_ok());
    }
}
