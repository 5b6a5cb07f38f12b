//! Provider pass-through routes.
//!
//! The provider's protocol endpoints (`/oauth2/...`) and metadata documents
//! (`/.well-known/...`) are proxied verbatim, any method, through the
//! redirect-rewriting forwarder.

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    response::Response,
    routing::any,
};
use wicket_proxy::{RequestContext, bad_gateway};

use crate::state::AppState;

/// Register the provider pass-through routes.
///
/// Routes are added only when the front door is enabled and the provider
/// target resolved at startup; otherwise the surrounding router stays
/// untouched (fail-safe disable, not fail-loud).
pub fn provider_proxy_routes(state: &AppState) -> Router<AppState> {
    if state.proxy.is_none() {
        return Router::new();
    }
    Router::new()
        .route("/oauth2/{*rest}", any(proxy_handler))
        .route("/.well-known/{*rest}", any(proxy_handler))
}

async fn proxy_handler(State(state): State<AppState>, req: Request<Body>) -> Response {
    let Some(proxy) = &state.proxy else {
        // Only reachable if routes were registered without a proxy.
        return bad_gateway();
    };

    let ctx = RequestContext::from_request(&req, state.config.tls_terminated);
    let method = req.method().clone();
    let uri = req.uri().clone();

    match proxy.forward(&ctx, req).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(
                method = %method,
                url = %uri,
                host = %ctx.host,
                target = %proxy.target(),
                error = %e,
                "provider proxy error"
            );
            bad_gateway()
        }
    }
}
