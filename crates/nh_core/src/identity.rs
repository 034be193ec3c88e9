//! Caller identification from bearer credentials.
//!
//! Tokens are *not* verified here. The resolver only reads the user
//! identifier out of the claims segment; authenticity is the auth
//! provider's business.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde_json::Value;
use tracing::debug;

use crate::{Error, Result};

/// Claim names checked for the user identifier, first match wins.
pub const USER_ID_CLAIMS: [&str; 3] = ["sub", "user_id", "x-hasura-user-id"];

#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Resolve a bearer token into a user identifier
    async fn resolve(&self, token: &str) -> Result<String>;
}

/// Reads the user identifier straight out of the token's claims.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnverifiedClaims;

#[async_trait]
impl IdentityResolver for UnverifiedClaims {
    async fn resolve(&self, token: &str) -> Result<String> {
        extract_user_id(token)
    }
}

/// Pulls the token out of an `Authorization` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str> {
    let token = header
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
        .unwrap_or_default();
    if token.is_empty() {
        return Err(Error::Unauthorized("Unauthorized".to_string()));
    }
    Ok(token)
}

pub fn extract_user_id(token: &str) -> Result<String> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        debug!("Rejecting token with {} segments", segments.len());
        return Err(invalid_token());
    }

    let payload = decode_segment(segments[1])?;
    let claims: Value = serde_json::from_slice(&payload).map_err(|e| {
        debug!("Token claims are not valid JSON: {}", e);
        invalid_token()
    })?;

    USER_ID_CLAIMS
        .iter()
        .find_map(|claim| match claims.get(claim) {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        })
        .ok_or_else(invalid_token)
}

// Accepts both the url-safe and the standard alphabet, padded or not.
fn decode_segment(segment: &str) -> Result<Vec<u8>> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    URL_SAFE_NO_PAD.decode(normalized).map_err(|e| {
        debug!("Token claims are not valid base64: {}", e);
        invalid_token()
    })
}

fn invalid_token() -> Error {
    Error::Unauthorized("Invalid token".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn token_with(claims: &str) -> String {
        format!("header.{}.signature", URL_SAFE_NO_PAD.encode(claims))
    }

    #[test]
    fn test_extracts_claims_in_priority_order() {
        let token = token_with(r#"{"user_id":"u-2","sub":"u-1"}"#);
        assert_eq!(extract_user_id(&token).unwrap(), "u-1");

        let token = token_with(r#"{"x-hasura-user-id":"u-3","user_id":"u-2"}"#);
        assert_eq!(extract_user_id(&token).unwrap(), "u-2");

        let token = token_with(r#"{"x-hasura-user-id":"u-3"}"#);
        assert_eq!(extract_user_id(&token).unwrap(), "u-3");
    }

    #[test]
    fn test_empty_claim_falls_through() {
        let token = token_with(r#"{"sub":"","user_id":"u-2"}"#);
        assert_eq!(extract_user_id(&token).unwrap(), "u-2");
    }

    #[test]
    fn test_accepts_padded_standard_alphabet() {
        let token = format!("h.{}.s", STANDARD.encode(r#"{"sub":"user>>?"}"#));
        assert_eq!(extract_user_id(&token).unwrap(), "user>>?");
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(matches!(extract_user_id("only.two"), Err(Error::Unauthorized(_))));
        assert!(matches!(extract_user_id("a.b.c.d"), Err(Error::Unauthorized(_))));
        assert!(matches!(extract_user_id("h.!!!.s"), Err(Error::Unauthorized(_))));

        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(matches!(extract_user_id(&not_json), Err(Error::Unauthorized(_))));

        let no_user = token_with(r#"{"role":"user"}"#);
        let err = extract_user_id(&no_user).unwrap_err();
        assert_eq!(err.to_string(), "Invalid token");
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(Some("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert_eq!(bearer_token(Some("abc.def.ghi")).unwrap(), "abc.def.ghi");
        assert!(matches!(bearer_token(None), Err(Error::Unauthorized(_))));
        assert!(matches!(bearer_token(Some("Bearer ")), Err(Error::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_unverified_claims_resolver() {
        let resolver = UnverifiedClaims;
        let token = token_with(r#"{"sub":"reader"}"#);
        assert_eq!(resolver.resolve(&token).await.unwrap(), "reader");
    }
}
