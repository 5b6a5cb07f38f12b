//! Collaborator seams for the provider-side flows.
//!
//! The login/consent/logout business logic (credential verification, 2FA,
//! consent-grant persistence) lives outside this crate. The gateway treats
//! each handler as an opaque HTTP endpoint and mounts it at its fixed path;
//! nothing here shares state with the collaborators.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, Request};
use axum::response::Response;

use crate::error::Result;

/// Provider-side flow handlers, supplied by the embedding application.
///
/// Each method backs exactly one route (see `routes::flow_routes`). The
/// handlers receive the raw request and produce the full response; the
/// gateway adds rate limiting and admin gating around them, nothing else.
#[async_trait]
pub trait FlowHandlers: Send + Sync {
    /// GET /oauth/login — show the login page, or auto-accept an existing
    /// session.
    async fn login_page(&self, req: Request<Body>) -> Response;

    /// POST /oauth/login — credential submission.
    async fn login_submit(&self, req: Request<Body>) -> Response;

    /// POST /oauth/login/2fa — second-factor submission.
    async fn login_2fa(&self, req: Request<Body>) -> Response;

    /// GET /oauth/consent — show the consent page, or auto-accept for
    /// trusted clients.
    async fn consent_page(&self, req: Request<Body>) -> Response;

    /// POST /oauth/consent — grant consent with selected scopes.
    async fn consent_submit(&self, req: Request<Body>) -> Response;

    /// POST /oauth/consent/reject — reject consent.
    async fn consent_reject(&self, req: Request<Body>) -> Response;

    /// GET /oauth/logout — handle provider-initiated logout.
    async fn logout(&self, req: Request<Body>) -> Response;

    /// GET /oauth/admin/clients — list registered clients.
    async fn list_clients(&self, req: Request<Body>) -> Response;

    /// POST /oauth/admin/clients — register a client.
    async fn register_client(&self, req: Request<Body>) -> Response;

    /// DELETE /oauth/admin/clients/{id} — delete a client.
    async fn delete_client(&self, id: &str, req: Request<Body>) -> Response;
}

/// Authentication gate for the admin sub-routes, supplied externally.
///
/// `Err` short-circuits the request with the error's response; the admin
/// handler never runs.
#[async_trait]
pub trait AdminGate: Send + Sync {
    async fn authorize(&self, headers: &HeaderMap) -> Result<()>;
}
