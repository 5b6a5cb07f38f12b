//! Transparent forwarding to the provider.
//!
//! One [`OAuthProxy`] instance serves every request; anything
//! request-scoped (the inbound host/scheme) travels in a
//! [`RequestContext`] rather than in the proxy itself.

use std::fmt;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode, Uri, header};
use futures::StreamExt;
use reqwest::Client;

use crate::error::{ProxyError, Result};
use crate::rewrite::rewrite_location;
use crate::scheme::RequestContext;

/// Fixed client-visible body for upstream failures. Internal error text
/// never leaks past this literal.
pub const BAD_GATEWAY_BODY: &str = "bad gateway";

/// Upstream provider base address, parsed once at startup.
#[derive(Debug, Clone)]
pub struct ProviderTarget {
    scheme: String,
    authority: String,
    base_path: String,
}

impl ProviderTarget {
    /// Parse the configured provider public URL.
    ///
    /// Scheme and host must both be present. On failure the caller is
    /// expected to disable the proxy subsystem rather than register broken
    /// routes.
    pub fn parse(public_url: &str) -> Result<Self> {
        let url = public_url.trim();
        if url.is_empty() {
            return Err(ProxyError::InvalidTarget {
                url: public_url.to_string(),
                reason: "empty URL".to_string(),
            });
        }
        let uri: Uri = url.parse().map_err(|e: axum::http::uri::InvalidUri| {
            ProxyError::InvalidTarget {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;
        let scheme = uri
            .scheme_str()
            .ok_or_else(|| ProxyError::InvalidTarget {
                url: url.to_string(),
                reason: "missing scheme".to_string(),
            })?
            .to_string();
        let authority = uri
            .authority()
            .ok_or_else(|| ProxyError::InvalidTarget {
                url: url.to_string(),
                reason: "missing host".to_string(),
            })?
            .to_string();
        let base_path = uri.path().trim_end_matches('/').to_string();
        Ok(Self {
            scheme,
            authority,
            base_path,
        })
    }

    /// Join the target base with an inbound path-and-query. The inbound
    /// path always starts with `/` and the base path never ends with one.
    fn upstream_url(&self, path_and_query: &str) -> String {
        format!(
            "{}://{}{}{}",
            self.scheme, self.authority, self.base_path, path_and_query
        )
    }
}

impl fmt::Display for ProviderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)
    }
}

/// Transparent reverse proxy bound to a fixed provider target.
#[derive(Debug, Clone)]
pub struct OAuthProxy {
    client: Client,
    target: ProviderTarget,
}

impl OAuthProxy {
    /// Create a proxy for the given target.
    ///
    /// Redirects are never followed: provider 3xx responses must reach the
    /// rewriter and then the client with their one-time codes intact.
    pub fn new(target: ProviderTarget) -> Result<Self> {
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self { client, target })
    }

    /// The provider target this proxy forwards to.
    pub fn target(&self) -> &ProviderTarget {
        &self.target
    }

    /// Forward one inbound request to the provider and relay the response.
    ///
    /// Request direction: hop-by-hop headers and `Host` stripped (the
    /// client sets `Host` from the upstream URL), `X-Forwarded-Host` /
    /// `X-Forwarded-Proto` stamped when non-empty, body streamed through
    /// without buffering. Response direction: status and headers relayed,
    /// `Location` conditionally rewritten, body streamed back. A single upstream failure surfaces as one error
    /// to this one request; nothing is retried.
    pub async fn forward(&self, ctx: &RequestContext, req: Request<Body>) -> Result<Response<Body>> {
        let (parts, body) = req.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = self.target.upstream_url(path_and_query);

        let mut headers = forwardable_headers(&parts.headers);
        if !ctx.host.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&ctx.host) {
                headers.insert("x-forwarded-host", value);
            }
        }
        if !ctx.scheme.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&ctx.scheme) {
                headers.insert("x-forwarded-proto", value);
            }
        }

        let upstream = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(reqwest::Body::wrap_stream(body.into_data_stream()))
            .send()
            .await?;

        let status = upstream.status();
        let mut resp_headers = forwardable_headers(upstream.headers());

        if !ctx.host.is_empty() {
            let location = resp_headers
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            if let Some(location) = location {
                if let Some(rewritten) = rewrite_location(status.as_u16(), &location, ctx) {
                    tracing::info!(old = %location, new = %rewritten, "rewrote provider redirect");
                    if let Ok(value) = HeaderValue::from_str(&rewritten) {
                        resp_headers.insert(header::LOCATION, value);
                    }
                }
            }
        }

        let stream = upstream
            .bytes_stream()
            .map(|result| result.map_err(std::io::Error::other));
        let mut response = Response::new(Body::from_stream(stream));
        *response.status_mut() = status;
        *response.headers_mut() = resp_headers;
        Ok(response)
    }
}

/// The fixed 502 returned for any upstream communication failure.
pub fn bad_gateway() -> Response<Body> {
    let mut response = Response::new(Body::from(BAD_GATEWAY_BODY));
    *response.status_mut() = StatusCode::BAD_GATEWAY;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}

/// Copy a header map, dropping hop-by-hop headers and `Host`.
fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if name == header::HOST || is_hop_by_hop(name) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

/// RFC 9110 connection-scoped headers that must not cross the proxy.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-connection"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}
