//! Provider-side flow routes.
//!
//! The provider redirects browsers here during login, consent, and logout.
//! Handlers are opaque collaborators (see [`crate::flows`]); this module
//! only owns the route table, rate limiting, and the admin gate.

use axum::{
    Router,
    body::Body,
    extract::{Path, Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};

use crate::ratelimit;
use crate::state::AppState;

/// Register the flow and admin routes.
///
/// Layout mirrors the provider contract:
///
/// - `GET/POST /oauth/login`, `POST /oauth/login/2fa`
/// - `GET/POST /oauth/consent`, `POST /oauth/consent/reject`
/// - `GET /oauth/logout`
/// - `GET/POST /oauth/admin/clients`, `DELETE /oauth/admin/clients/{id}`
///
/// Every route is rate limited; credential submissions sit behind the
/// stricter limiter as well, and admin routes behind the external gate.
pub fn flow_routes(state: &AppState) -> Router<AppState> {
    if !state.config.enabled {
        return Router::new();
    }

    let credential_routes = Router::new()
        .route("/oauth/login", post(login_submit))
        .route("/oauth/login/2fa", post(login_2fa))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            ratelimit::critical_rate_limit,
        ));

    let admin_routes = Router::new()
        .route(
            "/oauth/admin/clients",
            get(list_clients).post(register_client),
        )
        .route("/oauth/admin/clients/{id}", delete(delete_client))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_gate_middleware,
        ));

    Router::new()
        .route("/oauth/login", get(login_page))
        .route("/oauth/consent", get(consent_page).post(consent_submit))
        .route("/oauth/consent/reject", post(consent_reject))
        .route("/oauth/logout", get(logout))
        .merge(credential_routes)
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            ratelimit::api_rate_limit,
        ))
}

/// Admin gate middleware: the externally supplied gate decides, the
/// handler never runs on rejection.
async fn admin_gate_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if let Err(e) = state.admin_gate.authorize(request.headers()).await {
        return e.into_response();
    }
    next.run(request).await
}

async fn login_page(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.login_page(req).await
}

async fn login_submit(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.login_submit(req).await
}

async fn login_2fa(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.login_2fa(req).await
}

async fn consent_page(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.consent_page(req).await
}

async fn consent_submit(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.consent_submit(req).await
}

async fn consent_reject(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.consent_reject(req).await
}

async fn logout(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.logout(req).await
}

async fn list_clients(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.list_clients(req).await
}

async fn register_client(State(state): State<AppState>, req: Request<Body>) -> Response {
    state.flows.register_client(req).await
}

async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<String>,
    req: Request<Body>,
) -> Response {
    state.flows.delete_client(&id, req).await
}
