//! Per-attempt login state carried across the provider redirect
//!
//! One `AuthState` exists per in-flight login attempt. It is created at
//! `/auth/login`, travels only in a signed cookie, and is consumed exactly
//! once at `/auth/callback`. The PKCE verifier lives inside the state
//! payload, so concurrent logins each carry their own verifier and nothing
//! is shared across requests.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::TokenCodec;
use crate::error::{Error, Result};

/// Default lifetime of an Auth-State token: long enough to complete one
/// login round-trip, short enough that stale tokens age out.
pub const DEFAULT_STATE_TTL_SECS: u64 = 600;

/// Transient state for one login attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthState {
    /// Where to send the browser after the callback succeeds.
    pub back_to_path: String,
    /// PKCE verifier whose challenge was sent in the authorization request.
    pub pkce_verifier: String,
    /// Random value echoed by the provider as the `state` parameter.
    pub nonce: String,
    /// Issued-at, unix seconds.
    pub iat: u64,
    /// Expiry, unix seconds.
    pub exp: u64,
}

impl AuthState {
    /// Build the state for a fresh login attempt.
    pub fn new(back_to_path: impl Into<String>, pkce_verifier: impl Into<String>, ttl_secs: u64) -> Self {
        let now = unix_now();
        Self {
            back_to_path: back_to_path.into(),
            pkce_verifier: pkce_verifier.into(),
            nonce: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ttl_secs,
        }
    }
}

/// Seals and validates `AuthState` cookie values.
#[derive(Clone)]
pub struct AuthStateCodec {
    codec: TokenCodec,
}

impl AuthStateCodec {
    pub fn new(key: &[u8]) -> Self {
        Self {
            codec: TokenCodec::new(key),
        }
    }

    pub fn encode(&self, state: &AuthState) -> Result<String> {
        self.codec.encode(state)
    }

    /// Verify integrity and expiry. Any failure is `InvalidState` and is
    /// terminal for the callback that presented the token.
    pub fn decode(&self, token: &str) -> Result<AuthState> {
        let state: AuthState = self
            .codec
            .decode(token)
            .map_err(|e| Error::InvalidState(e.to_string()))?;

        if state.exp < unix_now() {
            return Err(Error::InvalidState("state has expired".into()));
        }

        Ok(state)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
