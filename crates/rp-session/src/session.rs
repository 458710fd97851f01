//! Post-login session snapshot
//!
//! The session is the `{token_set, user}` pair captured at callback
//! success. The browser holds the only copy, as a signed cookie; clearing
//! the cookie destroys the session. Readers treat a failed decode the same
//! as an absent session — a tampered cookie never yields partial data.

use oidc_client::{TokenSet, UserClaims};
use serde::{Deserialize, Serialize};

use crate::codec::TokenCodec;
use crate::error::{Error, Result};

/// Everything the application knows about an authenticated browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub token_set: TokenSet,
    pub user: UserClaims,
}

/// Seals and validates `Session` cookie values.
#[derive(Clone)]
pub struct SessionCodec {
    codec: TokenCodec,
}

impl SessionCodec {
    pub fn new(key: &[u8]) -> Self {
        Self {
            codec: TokenCodec::new(key),
        }
    }

    pub fn encode(&self, session: &Session) -> Result<String> {
        self.codec.encode(session)
    }

    pub fn decode(&self, token: &str) -> Result<Session> {
        self.codec
            .decode(token)
            .map_err(|e| Error::InvalidSession(e.to_string()))
    }
}
