//! Error types for the proxy core.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Errors that can occur while proxying to the provider.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The configured provider base URL is unusable.
    #[error("invalid provider URL '{url}': {reason}")]
    InvalidTarget { url: String, reason: String },

    /// Network/HTTP error talking to the provider.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        ProxyError::Upstream(e.to_string())
    }
}
