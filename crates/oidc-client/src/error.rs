//! Error types for identity-provider operations

/// Errors from identity-provider operations.
///
/// Each variant maps to one step of the callback handshake or logout:
/// `TokenExchange` and `ClaimsFetch` abort the callback, `Revocation` is
/// logged and swallowed at logout.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("authorization URL construction failed: {0}")]
    AuthorizationUrl(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("userinfo fetch failed: {0}")]
    ClaimsFetch(String),

    #[error("token revocation failed: {0}")]
    Revocation(String),
}

/// Result alias for provider operations.
pub type Result<T> = std::result::Result<T, Error>;
