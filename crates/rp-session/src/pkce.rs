//! PKCE (Proof Key for Code Exchange) per RFC 7636
//!
//! Generates the code verifier and S256 challenge for one login attempt.
//! The challenge goes into the authorization URL; the verifier rides inside
//! the signed Auth-State cookie and is presented at token exchange, so the
//! provider can prove the exchange request came from the party that started
//! the flow. A fresh verifier is generated per attempt — verifiers are
//! never reused or held in process-wide state.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;
use sha2::{Digest, Sha256};

/// Verifier length in random bytes, before base64 encoding.
/// 32 bytes encode to 43 characters, the RFC 7636 minimum.
const VERIFIER_BYTES: usize = 32;

/// Generate a cryptographically random PKCE code verifier.
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; VERIFIER_BYTES];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compute the S256 code challenge from a verifier.
///
/// `challenge = BASE64URL(SHA256(verifier))`
pub fn compute_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}
