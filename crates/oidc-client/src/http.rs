//! HTTP implementation of the provider capability
//!
//! Talks to a single statically configured provider: form-encoded POST for
//! the code exchange, bearer GET for userinfo, RFC 7009 POST for revocation.
//! Endpoint discovery is deliberately out of scope — the four endpoint URLs
//! come from configuration and are validated at config load.
//!
//! The reqwest client is injected by the caller so the service controls the
//! request timeout; a timed-out exchange or userinfo call surfaces as the
//! corresponding step error, never as a hang.

use common::Secret;
use url::Url;

use crate::error::{Error, Result};
use crate::types::{TokenSet, UserClaims};
use crate::OidcClient;

use std::future::Future;
use std::pin::Pin;

/// Static provider configuration resolved from the gateway config.
pub struct ProviderEndpoints {
    pub client_id: String,
    /// Absent for public clients; PKCE carries the proof instead.
    pub client_secret: Option<Secret<String>>,
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
    pub revocation_endpoint: Option<String>,
    pub end_session_endpoint: Option<String>,
    /// Space-separated scope list sent in the authorization request.
    pub scopes: String,
    /// Canonical callback URL registered with the provider.
    pub redirect_uri: String,
}

/// reqwest-backed `OidcClient` for one configured provider.
pub struct HttpOidcClient {
    client: reqwest::Client,
    endpoints: ProviderEndpoints,
}

impl HttpOidcClient {
    pub fn new(client: reqwest::Client, endpoints: ProviderEndpoints) -> Self {
        Self { client, endpoints }
    }

    async fn post_exchange(&self, code: &str, code_verifier: &str) -> Result<TokenSet> {
        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("code_verifier", code_verifier),
            ("client_id", &self.endpoints.client_id),
            ("redirect_uri", &self.endpoints.redirect_uri),
        ];
        if let Some(secret) = &self.endpoints.client_secret {
            form.push(("client_secret", secret.expose()));
        }

        let response = self
            .client
            .post(&self.endpoints.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::TokenExchange(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<TokenSet>()
            .await
            .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))
    }

    async fn get_userinfo(&self, access_token: &str) -> Result<UserClaims> {
        let response = self
            .client
            .get(&self.endpoints.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::Http(format!("userinfo request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::ClaimsFetch(format!(
                "userinfo endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<UserClaims>()
            .await
            .map_err(|e| Error::ClaimsFetch(format!("invalid userinfo response: {e}")))
    }

    async fn post_revoke(&self, access_token: &str) -> Result<()> {
        // Providers without a revocation endpoint simply keep the token
        // until it expires; nothing to do on our side.
        let Some(endpoint) = &self.endpoints.revocation_endpoint else {
            tracing::debug!("no revocation endpoint configured, skipping");
            return Ok(());
        };

        let mut form: Vec<(&str, &str)> = vec![
            ("token", access_token),
            ("token_type_hint", "access_token"),
            ("client_id", &self.endpoints.client_id),
        ];
        if let Some(secret) = &self.endpoints.client_secret {
            form.push(("client_secret", secret.expose()));
        }

        let response = self
            .client
            .post(endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Http(format!("revocation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(Error::Revocation(format!(
                "revocation endpoint returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

impl OidcClient for HttpOidcClient {
    fn authorization_url(&self, code_challenge: &str, state: &str) -> Result<String> {
        let mut url = Url::parse(&self.endpoints.authorization_endpoint)
            .map_err(|e| Error::AuthorizationUrl(format!("invalid authorization endpoint: {e}")))?;

        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.endpoints.client_id)
            .append_pair("redirect_uri", &self.endpoints.redirect_uri)
            .append_pair("scope", &self.endpoints.scopes)
            .append_pair("code_challenge", code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", state);

        Ok(url.into())
    }

    fn exchange_code<'a>(
        &'a self,
        code: &'a str,
        code_verifier: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TokenSet>> + Send + 'a>> {
        Box::pin(self.post_exchange(code, code_verifier))
    }

    fn fetch_userinfo<'a>(
        &'a self,
        access_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<UserClaims>> + Send + 'a>> {
        Box::pin(self.get_userinfo(access_token))
    }

    fn revoke_token<'a>(
        &'a self,
        access_token: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(self.post_revoke(access_token))
    }

    fn end_session_url(&self) -> Option<String> {
        self.endpoints.end_session_endpoint.clone()
    }
}
