//! Redirect-rewriting reverse proxy core for the wicket OAuth front door.
//!
//! Fronts an external OAuth2/OIDC provider behind the same public host that
//! serves the login/consent/logout flows. Protocol requests are forwarded
//! transparently; redirect locations pointing into the OAuth flows are
//! rewritten so the flow stays on the host and scheme the client actually
//! connected through, without static configuration of every public host.
//!
//! # Components
//!
//! - [`scheme`] — inbound scheme resolution from a lossy proxy-header chain
//! - [`rewrite`] — `Location` rewriting, gated to OAuth flow paths
//! - [`proxy`] — the transparent forwarder bound to the provider target

pub mod error;
pub mod proxy;
pub mod rewrite;
pub mod scheme;

pub use error::{ProxyError, Result};
pub use proxy::{BAD_GATEWAY_BODY, OAuthProxy, ProviderTarget, bad_gateway};
pub use rewrite::{OAUTH_REDIRECT_PATHS, is_oauth_redirect_path, rewrite_location};
pub use scheme::{RequestContext, inbound_host, resolve_scheme};
