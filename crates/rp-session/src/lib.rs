//! Login-attempt and session state for the OIDC relying-party gateway
//!
//! Everything the gateway needs to carry across request boundaries lives in
//! client-held cookies; this crate produces and validates their values.
//! There is no server-side store — HMAC integrity on the cookie value is the
//! only defense against forgery.
//!
//! Flow:
//! 1. Login generates a PKCE pair via `pkce::generate_verifier()` +
//!    `pkce::compute_challenge()`
//! 2. The verifier travels inside the signed `AuthState` cookie across the
//!    provider redirect round-trip (one verifier per attempt, never shared
//!    process-wide)
//! 3. The callback validates the state via `AuthStateCodec::decode()` and
//!    consumes it exactly once
//! 4. On success the `{token_set, user}` snapshot is sealed by
//!    `SessionCodec::encode()` into the session cookie

pub mod codec;
pub mod error;
pub mod pkce;
pub mod session;
pub mod state;

pub use codec::TokenCodec;
pub use error::{Error, Result};
pub use pkce::{compute_challenge, generate_verifier};
pub use session::{Session, SessionCodec};
pub use state::{AuthState, AuthStateCodec, DEFAULT_STATE_TTL_SECS};
