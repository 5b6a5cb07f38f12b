//! Inbound scheme resolution.
//!
//! The TLS-terminating proxy chain in front of this process can be lossy or
//! contradictory about the scheme the original client used. This module
//! consults a fixed priority list of signals and always produces a scheme.

use axum::http::{HeaderMap, Request, header};

/// Per-request view of the inbound host and scheme.
///
/// Computed fresh for every request — host and scheme can differ between
/// requests in multi-domain deployments, so this is never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Host the client addressed, including any port.
    pub host: String,
    /// Scheme the client used, per [`resolve_scheme`].
    pub scheme: String,
}

impl RequestContext {
    /// Derive the context from an inbound request.
    pub fn from_request<B>(req: &Request<B>, tls_terminated: bool) -> Self {
        Self {
            host: inbound_host(req),
            scheme: resolve_scheme(req.headers(), tls_terminated),
        }
    }
}

/// Host the client addressed, as seen on the wire.
///
/// HTTP/2 carries it in the `:authority` pseudo-header (surfaced through the
/// request URI); HTTP/1.1 in the `Host` header. Empty when neither is set.
pub fn inbound_host<B>(req: &Request<B>) -> String {
    if let Some(authority) = req.uri().authority() {
        return authority.to_string();
    }
    req.headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Resolve the scheme the original client used.
///
/// Signals are consulted in priority order; the first that yields a value
/// wins, and the rest are not looked at:
///
/// 1. `Forwarded` (RFC 7239) `proto` directive
/// 2. `CF-Visitor` scheme field
/// 3. `X-Forwarded-Proto`, trimmed, if non-empty
/// 4. direct TLS termination at this process → `https`
/// 5. default → `http`
///
/// The `http` default is only safe when TLS is terminated upstream of this
/// process; callers outside such a chain must set one of the forwarded
/// signals if end-to-end HTTPS has to be guaranteed.
pub fn resolve_scheme(headers: &HeaderMap, tls_terminated: bool) -> String {
    if let Some(proto) = headers
        .get(header::FORWARDED)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_forwarded_proto)
    {
        return proto;
    }
    if let Some(scheme) = headers
        .get("cf-visitor")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cf_visitor_scheme)
    {
        return scheme.to_string();
    }
    if let Some(proto) = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return proto.to_string();
    }
    if tls_terminated {
        return "https".to_string();
    }
    "http".to_string()
}

/// Extract the `proto` directive from an RFC 7239 `Forwarded` value.
///
/// Entries are comma-separated, directives within an entry semicolon
/// separated. The first `proto` directive found wins; malformed segments
/// are skipped, not fatal. Surrounding quotes are stripped and the value
/// lowercased.
fn parse_forwarded_proto(forwarded: &str) -> Option<String> {
    for entry in forwarded.split(',') {
        for part in entry.split(';') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let Some((key, value)) = part.split_once('=') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("proto") {
                let proto = value.trim().trim_matches('"');
                if !proto.is_empty() {
                    return Some(proto.to_ascii_lowercase());
                }
            }
        }
    }
    None
}

/// Extract the scheme from a `CF-Visitor` value.
///
/// The header shape is controlled by a single CDN vendor, so a containment
/// check stands in for real JSON decoding; anything else is no signal, not
/// an error.
fn parse_cf_visitor_scheme(cf_visitor: &str) -> Option<&'static str> {
    let cf_visitor = cf_visitor.trim();
    if cf_visitor.contains("\"scheme\":\"https\"") {
        Some("https")
    } else if cf_visitor.contains("\"scheme\":\"http\"") {
        Some("http")
    } else {
        None
    }
}
