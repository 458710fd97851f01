//! Identity-provider client for the OIDC Authorization Code + PKCE flow
//!
//! Defines the `OidcClient` trait that decouples the login/callback/logout
//! handlers from the concrete provider transport, plus `HttpOidcClient`,
//! a reqwest implementation driven by statically configured endpoints.
//!
//! Capability surface, one method per protocol interaction:
//! 1. `authorization_url()` — build the browser redirect (no network)
//! 2. `exchange_code()` — redeem the authorization code with the PKCE verifier
//! 3. `fetch_userinfo()` — retrieve claims with the access token
//! 4. `revoke_token()` — best-effort revocation at logout
//! 5. `end_session_url()` — provider single-sign-out, where advertised

pub mod error;
pub mod http;
pub mod types;

pub use error::{Error, Result};
pub use http::{HttpOidcClient, ProviderEndpoints};
pub use types::{TokenSet, UserClaims};

use std::future::Future;
use std::pin::Pin;

/// Abstraction over the identity provider.
///
/// Handlers receive this as `Arc<dyn OidcClient>` rather than looking the
/// client up from ambient application state, so tests can substitute a mock
/// provider. Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility.
pub trait OidcClient: Send + Sync {
    /// Build the authorization URL carrying the PKCE challenge (S256) and
    /// the opaque `state` value. Construction failure is terminal for the
    /// login attempt; no cookie may be written after it fails.
    fn authorization_url(&self, code_challenge: &str, state: &str) -> Result<String>;

    /// Exchange an authorization code for tokens, proving possession of the
    /// verifier whose challenge was sent in the authorization request.
    fn exchange_code<'a>(
        &'a self,
        code: &'a str,
        code_verifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TokenSet>> + Send + 'a>>;

    /// Fetch user claims from the userinfo endpoint.
    fn fetch_userinfo<'a>(
        &'a self,
        access_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<UserClaims>> + Send + 'a>>;

    /// Revoke an access token (RFC 7009). A no-op when the provider
    /// advertises no revocation endpoint.
    fn revoke_token<'a>(
        &'a self,
        access_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

    /// Provider end-session URL for single-sign-out, if advertised.
    /// Optional capability: many providers omit it from their metadata.
    fn end_session_url(&self) -> Option<String>;
}
