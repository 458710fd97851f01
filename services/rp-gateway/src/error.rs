//! Request-level error types
//!
//! Callback failures abort the login attempt with no session written:
//! `InvalidState` and `InvalidCallback` are client-side failures (400),
//! `TokenExchangeFailed` and `ClaimsFetchFailed` are provider-side (502).
//! Revocation failure at logout is deliberately NOT here — it is logged
//! and swallowed, never surfaced to the user.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced to the browser from the auth handlers.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Auth-State cookie missing, tampered, or expired at callback.
    #[error("invalid auth state: {0}")]
    InvalidState(String),

    /// Provider returned an error or the callback lacked a code.
    #[error("invalid callback: {0}")]
    InvalidCallback(String),

    /// Code exchange rejected by the provider (bad code, verifier mismatch).
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Userinfo retrieval failed after a successful exchange.
    #[error("claims fetch failed: {0}")]
    ClaimsFetchFailed(String),

    /// Authorization URL construction failed; login aborted before any
    /// cookie was written.
    #[error("login could not be initiated: {0}")]
    LoginFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidState(_) | AuthError::InvalidCallback(_) => StatusCode::BAD_REQUEST,
            AuthError::TokenExchangeFailed(_) | AuthError::ClaimsFetchFailed(_) => {
                StatusCode::BAD_GATEWAY
            }
            AuthError::LoginFailed(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short failure-stage label used for the `auth_login_failures_total`
    /// metric.
    pub fn stage(&self) -> &'static str {
        match self {
            AuthError::InvalidState(_) => "invalid_state",
            AuthError::InvalidCallback(_) => "invalid_callback",
            AuthError::TokenExchangeFailed(_) => "token_exchange",
            AuthError::ClaimsFetchFailed(_) => "claims_fetch",
            AuthError::LoginFailed(_) => "login_init",
            AuthError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            serde_json::json!({ "error": self.to_string() }).to_string(),
        )
            .into_response()
    }
}
