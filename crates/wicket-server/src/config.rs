//! Gateway configuration.
//!
//! Resolved once at startup and passed explicitly into router construction;
//! nothing here is read through globals.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// Default requests per minute for flow endpoints.
pub const DEFAULT_API_RPM: u32 = 120;

/// Default requests per minute for credential-submission endpoints.
pub const DEFAULT_CRITICAL_RPM: u32 = 20;

/// Gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Master switch for the provider front door. When off, neither proxy
    /// nor flow routes are registered.
    pub enabled: bool,

    /// Public base URL of the provider, e.g. `http://hydra.internal:4444`.
    /// An unparseable or incomplete value disables the proxy subsystem
    /// (logged, never a crash — proxying is an optional feature).
    pub public_url: String,

    /// Whether this process terminates TLS itself. Usually false: TLS
    /// termination is expected upstream, and the forwarded-header chain
    /// carries the client scheme.
    pub tls_terminated: bool,

    /// Enable rate limiting on flow routes.
    pub rate_limiting: bool,

    /// Requests per minute for general flow endpoints.
    pub api_rpm: u32,

    /// Requests per minute for credential-submission endpoints
    /// (login and 2FA submissions).
    pub critical_rpm: u32,

    /// Enable request completion logging.
    pub request_logging: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            public_url: String::new(),
            tls_terminated: false,
            rate_limiting: true,
            api_rpm: DEFAULT_API_RPM,
            critical_rpm: DEFAULT_CRITICAL_RPM,
            request_logging: true,
        }
    }
}

impl GatewayConfig {
    /// Create an enabled config for the given provider public URL.
    pub fn new(public_url: impl Into<String>) -> Self {
        Self {
            enabled: true,
            public_url: public_url.into(),
            ..Default::default()
        }
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Enable or disable the front door.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Mark this process as terminating TLS itself.
    pub fn with_tls_terminated(mut self, tls_terminated: bool) -> Self {
        self.tls_terminated = tls_terminated;
        self
    }

    /// Enable or disable rate limiting.
    pub fn with_rate_limiting(mut self, enabled: bool) -> Self {
        self.rate_limiting = enabled;
        self
    }

    /// Set the flow-endpoint rate limit (requests per minute).
    pub fn with_api_rpm(mut self, rpm: u32) -> Self {
        self.api_rpm = rpm;
        self
    }

    /// Set the credential-submission rate limit (requests per minute).
    pub fn with_critical_rpm(mut self, rpm: u32) -> Self {
        self.critical_rpm = rpm;
        self
    }

    /// Enable or disable request completion logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }
}
