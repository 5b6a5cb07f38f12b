//! Application state shared across handlers.

use std::sync::Arc;

use wicket_proxy::{OAuthProxy, ProviderTarget};

use crate::config::GatewayConfig;
use crate::flows::{AdminGate, FlowHandlers};
use crate::ratelimit::RateLimiters;

/// Application state shared across all handlers. Clone-cheap: everything
/// request-independent sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration, resolved once at startup.
    pub config: Arc<GatewayConfig>,

    /// Provider proxy — `None` when disabled or misconfigured, in which
    /// case no proxy routes are registered.
    pub proxy: Option<Arc<OAuthProxy>>,

    /// Provider-side flow handlers (opaque collaborator).
    pub flows: Arc<dyn FlowHandlers>,

    /// Admin authentication gate (opaque collaborator).
    pub admin_gate: Arc<dyn AdminGate>,

    /// Flow-route rate limiters.
    pub limiters: Arc<RateLimiters>,
}

impl AppState {
    /// Build the state, resolving the provider target once.
    ///
    /// An invalid or incomplete provider URL disables the proxy subsystem
    /// with a logged diagnostic instead of failing: proxying is an optional
    /// feature and must not take the rest of the server down.
    pub fn new(
        config: GatewayConfig,
        flows: Arc<dyn FlowHandlers>,
        admin_gate: Arc<dyn AdminGate>,
    ) -> Self {
        let proxy = build_proxy(&config);
        let limiters = Arc::new(RateLimiters::new(&config));
        Self {
            config: Arc::new(config),
            proxy,
            flows,
            admin_gate,
            limiters,
        }
    }
}

fn build_proxy(config: &GatewayConfig) -> Option<Arc<OAuthProxy>> {
    if !config.enabled {
        return None;
    }
    let target = match ProviderTarget::parse(&config.public_url) {
        Ok(target) => target,
        Err(e) => {
            tracing::warn!(url = %config.public_url, error = %e, "provider proxy disabled");
            return None;
        }
    };
    match OAuthProxy::new(target) {
        Ok(proxy) => Some(Arc::new(proxy)),
        Err(e) => {
            tracing::warn!(error = %e, "failed to build provider client, proxy disabled");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubFlows, StubGate};

    fn state_with(config: GatewayConfig) -> AppState {
        AppState::new(config, Arc::new(StubFlows::default()), Arc::new(StubGate::allow()))
    }

    #[test]
    fn test_disabled_config_has_no_proxy() {
        let state = state_with(GatewayConfig::default());
        assert!(state.proxy.is_none());
    }

    #[test]
    fn test_invalid_url_disables_proxy() {
        let state = state_with(GatewayConfig::new("not a url"));
        assert!(state.proxy.is_none());
    }

    #[test]
    fn test_missing_scheme_disables_proxy() {
        let state = state_with(GatewayConfig::new("hydra.internal:4444"));
        assert!(state.proxy.is_none());
    }

    #[test]
    fn test_valid_url_builds_proxy() {
        let state = state_with(GatewayConfig::new("http://hydra.internal:4444"));
        assert!(state.proxy.is_some());
    }
}
