//! `Location` rewriting for provider redirects.
//!
//! The provider advertises absolute URLs based on its own configured base
//! URL, which may not be the host/scheme the client actually connected
//! through. Redirects into the OAuth flows this gateway owns are rewritten
//! to the inbound host/scheme; everything else is relayed untouched.

use axum::http::Uri;

use crate::scheme::RequestContext;

/// Path prefixes of redirects owned by the OAuth flows this gateway fronts.
///
/// Only locations under these prefixes are eligible for rewriting. The
/// gating keeps the rewrite narrowly scoped: the provider may also redirect
/// to targets this system does not own (asset CDNs, third-party pages), and
/// those must pass through untouched.
pub const OAUTH_REDIRECT_PATHS: &[&str] = &["/oauth/login", "/oauth/consent", "/oauth/logout"];

/// Whether a path belongs to the rewritable OAuth flow surface.
pub fn is_oauth_redirect_path(path: &str) -> bool {
    OAUTH_REDIRECT_PATHS
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Rewrite a redirect `Location` so the flow stays on the host and scheme
/// the client actually connected through.
///
/// Returns `Some(rewritten)` only when a rewrite is warranted; `None` means
/// relay the header unchanged. Pass-through cases:
///
/// - status outside [300, 400)
/// - empty or unparseable location (rewriting is best-effort, a malformed
///   header must never fail the response)
/// - relative location — no authority to rewrite, and stamping a scheme
///   onto a host-less reference would corrupt it
/// - path outside [`OAUTH_REDIRECT_PATHS`]
/// - location already consistent with the inbound context
///
/// Host and scheme are replaced independently, each only when the inbound
/// value is non-empty and differs. Re-applying with the same context is a
/// no-op, so the rewrite is idempotent.
pub fn rewrite_location(status: u16, location: &str, ctx: &RequestContext) -> Option<String> {
    if !(300..400).contains(&status) {
        return None;
    }
    if location.is_empty() {
        return None;
    }
    let uri: Uri = location.parse().ok()?;
    let authority = uri.authority()?;
    if !is_oauth_redirect_path(uri.path()) {
        return None;
    }

    let mut host = authority.as_str().to_string();
    let mut scheme = uri.scheme_str().unwrap_or_default().to_string();
    let mut changed = false;

    if !ctx.host.is_empty() && host != ctx.host {
        host = ctx.host.clone();
        changed = true;
    }
    if !ctx.scheme.is_empty() && scheme != ctx.scheme {
        scheme = ctx.scheme.clone();
        changed = true;
    }
    if !changed {
        return None;
    }

    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let rewritten = Uri::builder()
        .scheme(scheme.as_str())
        .authority(host.as_str())
        .path_and_query(path_and_query)
        .build()
        .ok()?;
    Some(rewritten.to_string())
}
