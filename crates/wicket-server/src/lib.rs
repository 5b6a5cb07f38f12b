//! HTTP surface for the wicket OAuth front door.
//!
//! Assembles one public-facing router that serves both the proxied provider
//! (protocol endpoints, well-known metadata) and the provider-side
//! login/consent/logout flows, so a single host fronts the whole OAuth
//! surface.
//!
//! # Features
//!
//! - Provider pass-through with redirect rewriting (via `wicket-proxy`)
//! - Flow and admin route registration around opaque collaborator handlers
//! - Rate limiting (general + stricter credential-submission tier)
//! - Request logging
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wicket_server::{Gateway, GatewayConfig};
//!
//! let config = GatewayConfig::new("http://hydra.internal:4444");
//! let gateway = Gateway::new(config, flows, admin_gate);
//! gateway.run("0.0.0.0:3000".parse()?).await?;
//! ```

pub mod config;
pub mod error;
pub mod flows;
pub mod ratelimit;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::{Result, ServerError};
pub use flows::{AdminGate, FlowHandlers};
pub use ratelimit::{RateLimiters, api_rate_limit, critical_rate_limit};
pub use state::AppState;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// The gateway server: provider pass-through plus flow routes.
pub struct Gateway {
    /// Application state.
    state: AppState,
}

impl Gateway {
    /// Create a gateway from configuration and collaborators.
    pub fn new(
        config: GatewayConfig,
        flows: Arc<dyn FlowHandlers>,
        admin_gate: Arc<dyn AdminGate>,
    ) -> Self {
        Self {
            state: AppState::new(config, flows, admin_gate),
        }
    }

    /// Create a gateway from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    ///
    /// When the front door is disabled only the health route is present;
    /// when the provider URL is invalid the flow routes are present but the
    /// pass-through routes are not.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .merge(routes::flow_routes(&self.state))
            .merge(routes::provider_proxy_routes(&self.state))
            // Request logging (inner layer, runs per matched route)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                ratelimit::request_logging_middleware,
            ))
            // TraceLayer for detailed HTTP tracing
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the gateway.
    pub async fn run(self, addr: SocketAddr) -> Result<()> {
        let router = self.router();

        info!("Starting gateway on {}", addr);

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{HeaderMap, Request};
    use axum::response::{IntoResponse, Response};

    use crate::config::GatewayConfig;
    use crate::error::{Result, ServerError};
    use crate::flows::{AdminGate, FlowHandlers};
    use crate::state::AppState;

    /// Flow stub answering every route with the handler name, so tests can
    /// assert which handler a route dispatched to.
    #[derive(Debug, Default)]
    pub struct StubFlows;

    #[async_trait]
    impl FlowHandlers for StubFlows {
        async fn login_page(&self, _req: Request<Body>) -> Response {
            "login_page".into_response()
        }
        async fn login_submit(&self, _req: Request<Body>) -> Response {
            "login_submit".into_response()
        }
        async fn login_2fa(&self, _req: Request<Body>) -> Response {
            "login_2fa".into_response()
        }
        async fn consent_page(&self, _req: Request<Body>) -> Response {
            "consent_page".into_response()
        }
        async fn consent_submit(&self, _req: Request<Body>) -> Response {
            "consent_submit".into_response()
        }
        async fn consent_reject(&self, _req: Request<Body>) -> Response {
            "consent_reject".into_response()
        }
        async fn logout(&self, _req: Request<Body>) -> Response {
            "logout".into_response()
        }
        async fn list_clients(&self, _req: Request<Body>) -> Response {
            "list_clients".into_response()
        }
        async fn register_client(&self, _req: Request<Body>) -> Response {
            "register_client".into_response()
        }
        async fn delete_client(&self, id: &str, _req: Request<Body>) -> Response {
            format!("delete_client:{id}").into_response()
        }
    }

    /// Gate stub with a fixed verdict.
    #[derive(Debug)]
    pub struct StubGate {
        allow: bool,
    }

    impl StubGate {
        pub fn allow() -> Self {
            Self { allow: true }
        }

        pub fn deny() -> Self {
            Self { allow: false }
        }
    }

    #[async_trait]
    impl AdminGate for StubGate {
        async fn authorize(&self, _headers: &HeaderMap) -> Result<()> {
            if self.allow {
                Ok(())
            } else {
                Err(ServerError::Unauthorized("admin token required".to_string()))
            }
        }
    }

    /// State with an enabled front door (no provider URL) and stub
    /// collaborators. `customize` tweaks the config.
    pub fn test_state(customize: impl FnOnce(GatewayConfig) -> GatewayConfig) -> AppState {
        let config = customize(GatewayConfig::default().with_enabled(true));
        AppState::new(config, Arc::new(StubFlows), Arc::new(StubGate::allow()))
    }

    /// State with a specific admin gate verdict.
    pub fn test_state_with_gate(gate: StubGate) -> AppState {
        AppState::new(
            GatewayConfig::default().with_enabled(true),
            Arc::new(StubFlows),
            Arc::new(gate),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_endpoint() {
        let gateway = Gateway::from_state(test_state(|c| c));
        let app = gateway.router();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_disabled_front_door_registers_nothing() {
        let gateway = Gateway::from_state(test_state(|c| c.with_enabled(false)));
        let app = gateway.router();

        for uri in ["/oauth/login", "/oauth2/auth", "/.well-known/openid-configuration"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_invalid_provider_url_keeps_flow_routes() {
        let gateway = Gateway::from_state(test_state(|mut c| {
            c.public_url = "no-scheme".to_string();
            c
        }));
        let app = gateway.router();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/oauth/login")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/oauth2/auth")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
