//! HS256 JSON Web Tokens for admin sessions.
//!
//! # Design Decisions
//! - Only `HS256` is accepted; the header algorithm is checked before the signature
//! - Claims are fixed: subject (user id), issuer, expiry and issue time
//! - Time is passed in by the caller, in seconds since the Unix epoch

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::auth::constant_time_eq;

type HmacSha256 = Hmac<Sha256>;

/// Issuer written into and required from every token.
pub const ISSUER: &str = "switchman";

/// How long an issued token stays valid.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(2 * 60 * 60);

const ALGORITHM: &str = "HS256";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("unsupported token algorithm")]
    Algorithm,
    #[error("invalid token signature")]
    Signature,
    #[error("token expired")]
    Expired,
    #[error("token issued by someone else")]
    Issuer,
    #[error("unusable signing key")]
    Key,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub exp: u64,
    pub iat: u64,
}

impl Claims {
    /// Claims for `user_id`, valid for [`TOKEN_LIFETIME`] from `now`.
    pub fn for_user(user_id: &str, now: u64) -> Self {
        Self {
            sub: user_id.to_string(),
            iss: ISSUER.to_string(),
            exp: now + TOKEN_LIFETIME.as_secs(),
            iat: now,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Seconds since the Unix epoch.
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Sign `claims` into a compact token.
pub fn encode(secret: &[u8], claims: &Claims) -> Result<String, TokenError> {
    let header = Header {
        alg: ALGORITHM.to_string(),
        typ: "JWT".to_string(),
    };
    let header = serde_json::to_vec(&header).map_err(|_| TokenError::Malformed)?;
    let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;

    let signing_input = format!("{}.{}", URL_SAFE_NO_PAD.encode(header), URL_SAFE_NO_PAD.encode(payload));
    let signature = sign(secret, &signing_input)?;
    Ok(format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify `token` and return its claims if it is still valid at `now`.
pub fn decode(secret: &[u8], token: &str, now: u64) -> Result<Claims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    let &[header_b64, payload_b64, signature_b64] = parts.as_slice() else {
        return Err(TokenError::Malformed);
    };

    let header: Header = decode_json(header_b64)?;
    if header.alg != ALGORITHM {
        return Err(TokenError::Algorithm);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Malformed)?;
    let expected = sign(secret, &format!("{header_b64}.{payload_b64}"))?;
    if !constant_time_eq(&signature, &expected) {
        return Err(TokenError::Signature);
    }

    let claims: Claims = decode_json(payload_b64)?;
    if claims.exp <= now {
        return Err(TokenError::Expired);
    }
    if claims.iss != ISSUER {
        return Err(TokenError::Issuer);
    }
    Ok(claims)
}

fn sign(secret: &[u8], signing_input: &str) -> Result<Vec<u8>, TokenError> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| TokenError::Key)?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

fn decode_json<T: DeserializeOwned>(part: &str) -> Result<T, TokenError> {
    let bytes = URL_SAFE_NO_PAD.decode(part).map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}
