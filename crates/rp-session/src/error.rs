//! Error types for state and session codecs

/// Errors from cookie-token encoding and validation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Auth-State cookie missing, tampered, malformed, or expired.
    /// Terminal for the callback that observed it.
    #[error("invalid auth state: {0}")]
    InvalidState(String),

    /// Session cookie tampered or malformed. Callers treat this the same
    /// as an absent session.
    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// Signature or structural failure on a raw token.
    #[error("token verification failed: {0}")]
    InvalidToken(String),

    #[error("token encoding failed: {0}")]
    Encode(String),
}

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
