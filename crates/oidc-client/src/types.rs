//! Wire types returned by the identity provider
//!
//! `TokenSet` is the token endpoint response; `UserClaims` is the userinfo
//! response for the `openid email profile` scopes. Both are stored verbatim
//! inside the session cookie, so they derive Serialize as well.

use serde::{Deserialize, Serialize};

/// Token bundle returned by the token endpoint.
///
/// `expires_in` is a delta in seconds from the response time, not an
/// absolute timestamp. `refresh_token` is absent unless the provider was
/// asked for offline access; `id_token` is absent for plain OAuth servers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Seconds until the access token expires (delta, not absolute)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Standard claims from the userinfo endpoint.
///
/// `sub` is the only claim OIDC guarantees; everything else depends on the
/// granted scopes and the provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserClaims {
    pub sub: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_set_deserializes_full_response() {
        let json = r#"{
            "access_token": "at_abc",
            "refresh_token": "rt_def",
            "id_token": "eyJ.header.sig",
            "expires_in": 3600,
            "token_type": "Bearer"
        }"#;
        let tokens: TokenSet = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "at_abc");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt_def"));
        assert_eq!(tokens.expires_in, Some(3600));
    }

    #[test]
    fn token_set_tolerates_minimal_response() {
        // Providers without offline access return only the access token
        let json = r#"{"access_token":"at_only"}"#;
        let tokens: TokenSet = serde_json::from_str(json).unwrap();
        assert_eq!(tokens.access_token, "at_only");
        assert!(tokens.refresh_token.is_none());
        assert!(tokens.id_token.is_none());
    }

    #[test]
    fn user_claims_requires_sub() {
        let result = serde_json::from_str::<UserClaims>(r#"{"email":"a@b.c"}"#);
        assert!(result.is_err(), "claims without sub must not parse");
    }

    #[test]
    fn user_claims_roundtrips() {
        let claims = UserClaims {
            sub: "user-123".into(),
            email: Some("alex@example.com".into()),
            email_verified: Some(true),
            name: Some("Alex Example".into()),
            picture: None,
        };
        let json = serde_json::to_string(&claims).unwrap();
        let back: UserClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claims);
        // Absent optional claims are omitted, not serialized as null
        assert!(!json.contains("picture"));
    }
}
