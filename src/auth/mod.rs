use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;

/// Bearer token claims issued by the authentication service.
///
/// `sid` identifies the session the token was minted for; older tokens carry
/// only the standard `jti`, which is used as a fallback session identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, session_id: Option<String>) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            sid: session_id,
            jti: Some(Uuid::new_v4().to_string()),
            exp,
            iat: now.timestamp(),
        }
    }

    /// Session identifier for CSRF binding: `sid` when present, else `jti`.
    pub fn session_id(&self) -> Option<&str> {
        self.sid.as_deref().or(self.jti.as_deref())
    }
}

/// Loosely-typed claims recovered without signature verification.
///
/// Used only for advisory CSRF session binding; every field is optional
/// because tokens from the external auth service are not guaranteed to carry
/// any of them. Signature enforcement on protected routes stays with
/// `verify_token` in the JWT middleware.
#[derive(Debug, Default, Deserialize)]
pub struct UnverifiedClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub jti: Option<String>,
}

impl UnverifiedClaims {
    pub fn session_id(&self) -> Option<&str> {
        self.sid.as_deref().or(self.jti.as_deref())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

pub fn generate_token(claims: &Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Validate signature and expiry, returning the full claims.
pub fn verify_token(token: &str) -> Result<Claims, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Decode the payload without checking the signature or expiry.
///
/// Returns `None` on any decode failure; callers treat the result as
/// advisory only.
pub fn decode_unverified(token: &str) -> Option<UnverifiedClaims> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<UnverifiedClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .map(|data| data.claims)
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Build a syntactically valid JWT with a junk signature
    fn unsigned_token(payload: serde_json::Value) -> String {
        let header = serde_json::json!({"alg": "HS256", "typ": "JWT"});
        format!(
            "{}.{}.{}",
            base64_url_encode(header.to_string().as_bytes()),
            base64_url_encode(payload.to_string().as_bytes()),
            base64_url_encode(b"junk-signature")
        )
    }

    fn base64_url_encode(input: &[u8]) -> String {
        const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";
        let mut out = String::new();
        for chunk in input.chunks(3) {
            let b = [chunk[0], *chunk.get(1).unwrap_or(&0), *chunk.get(2).unwrap_or(&0)];
            let n = (u32::from(b[0]) << 16) | (u32::from(b[1]) << 8) | u32::from(b[2]);
            out.push(ALPHABET[(n >> 18) as usize & 63] as char);
            out.push(ALPHABET[(n >> 12) as usize & 63] as char);
            if chunk.len() > 1 {
                out.push(ALPHABET[(n >> 6) as usize & 63] as char);
            }
            if chunk.len() > 2 {
                out.push(ALPHABET[n as usize & 63] as char);
            }
        }
        out
    }

    #[test]
    fn decode_unverified_recovers_sid_and_sub() {
        let token = unsigned_token(serde_json::json!({
            "sub": "user-1",
            "sid": "session-9",
            "exp": 0,
        }));
        let claims = decode_unverified(&token).expect("payload should decode");
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.session_id(), Some("session-9"));
    }

    #[test]
    fn decode_unverified_falls_back_to_jti() {
        let token = unsigned_token(serde_json::json!({"jti": "tok-3"}));
        let claims = decode_unverified(&token).expect("payload should decode");
        assert_eq!(claims.session_id(), Some("tok-3"));
        assert_eq!(claims.sub, None);
    }

    #[test]
    fn decode_unverified_swallow_garbage() {
        assert!(decode_unverified("not-a-jwt").is_none());
        assert!(decode_unverified("a.b.c").is_none());
    }
}
