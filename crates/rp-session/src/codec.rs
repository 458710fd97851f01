//! HMAC-signed token codec for cookie values
//!
//! Token format: `BASE64URL(json payload) "." BASE64URL(HMAC-SHA256 tag)`.
//! The payload is readable by the browser (it is not encrypted), but any
//! modification invalidates the tag, so a decoded value can be trusted.
//! Decode never falls back to a default — every structural or signature
//! failure is an error.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies cookie-safe tokens with a shared secret key.
///
/// One codec instance backs both the Auth-State and Session cookies; the
/// typed wrappers in `state` and `session` add their own semantics on top.
#[derive(Clone)]
pub struct TokenCodec {
    key: Vec<u8>,
}

impl TokenCodec {
    pub fn new(key: &[u8]) -> Self {
        Self { key: key.to_vec() }
    }

    fn mac(&self) -> HmacSha256 {
        // new_from_slice is infallible for HMAC (any key length is valid)
        HmacSha256::new_from_slice(&self.key).expect("HMAC key of any length is accepted")
    }

    /// Serialize `value` and append its authentication tag.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<String> {
        let payload = serde_json::to_vec(value).map_err(|e| Error::Encode(e.to_string()))?;
        let mut mac = self.mac();
        mac.update(&payload);
        let tag = mac.finalize().into_bytes();
        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }

    /// Verify the tag and deserialize the payload.
    ///
    /// Signature comparison is constant-time (`Mac::verify_slice`).
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let (payload_b64, tag_b64) = token
            .split_once('.')
            .ok_or_else(|| Error::InvalidToken("missing signature separator".into()))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| Error::InvalidToken(format!("payload not base64url: {e}")))?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag_b64)
            .map_err(|e| Error::InvalidToken(format!("tag not base64url: {e}")))?;

        let mut mac = self.mac();
        mac.update(&payload);
        mac.verify_slice(&tag)
            .map_err(|_| Error::InvalidToken("signature mismatch".into()))?;

        serde_json::from_slice(&payload)
            .map_err(|e| Error::InvalidToken(format!("payload not valid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        path: String,
        count: u32,
    }

    fn test_codec() -> TokenCodec {
        TokenCodec::new(b"a-test-signing-key-at-least-32-bytes")
    }

    #[test]
    fn encode_decode_roundtrips() {
        let codec = test_codec();
        let value = Payload {
            path: "/dashboard".into(),
            count: 7,
        };
        let token = codec.encode(&value).unwrap();
        let back: Payload = codec.decode(&token).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn token_is_cookie_safe() {
        let codec = test_codec();
        let token = codec
            .encode(&Payload {
                path: "/a b;c,d".into(),
                count: 0,
            })
            .unwrap();
        // No characters a Set-Cookie value would need quoting for
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'),
            "token must be base64url + separator only: {token}"
        );
    }

    #[test]
    fn empty_token_fails() {
        let codec = test_codec();
        assert!(codec.decode::<Payload>("").is_err());
    }

    #[test]
    fn tampered_payload_fails() {
        let codec = test_codec();
        let token = codec
            .encode(&Payload {
                path: "/private".into(),
                count: 1,
            })
            .unwrap();

        // Flip a character in the payload half
        let mut chars: Vec<char> = token.chars().collect();
        chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
        let tampered: String = chars.into_iter().collect();

        let result = codec.decode::<Payload>(&tampered);
        assert!(matches!(result, Err(Error::InvalidToken(_))));
    }

    #[test]
    fn truncated_tag_fails() {
        let codec = test_codec();
        let token = codec
            .encode(&Payload {
                path: "/private".into(),
                count: 1,
            })
            .unwrap();
        let truncated = &token[..token.len() - 8];
        assert!(codec.decode::<Payload>(truncated).is_err());
    }

    #[test]
    fn wrong_key_fails() {
        let codec = test_codec();
        let other = TokenCodec::new(b"a-different-signing-key-of-32-bytes!");
        let token = codec
            .encode(&Payload {
                path: "/private".into(),
                count: 1,
            })
            .unwrap();
        assert!(other.decode::<Payload>(&token).is_err());
    }

    #[test]
    fn unsigned_payload_fails() {
        // A well-formed payload with no tag at all must not decode
        let codec = test_codec();
        let payload = URL_SAFE_NO_PAD.encode(br#"{"path":"/forged","count":9}"#);
        assert!(codec.decode::<Payload>(&payload).is_err());
    }
}
