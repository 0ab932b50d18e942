//! Session token codec (HS256 compact JWT).
//!
//! Tokens are signed with a server-held secret and carry the user id, email,
//! and role plus issuer/expiry claims. Verification is pure: callers supply
//! the wall-clock time so expiry checks stay deterministic under test.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use super::identity::Role;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Claims carried inside a session token. Field names match the wire format
/// the web clients expect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    #[serde(rename = "type")]
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid token format")]
    TokenFormat,
    #[error("invalid base64url encoding")]
    Base64,
    #[error("invalid json")]
    Json(#[from] serde_json::Error),
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlg(String),
    #[error("invalid signing key")]
    InvalidKey,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid issuer")]
    InvalidIssuer,
}

fn b64e_json<T: Serialize>(value: &T) -> Result<String, Error> {
    let json = serde_json::to_vec(value)?;
    Ok(Base64UrlUnpadded::encode_string(&json))
}

fn b64d_json<T: for<'de> Deserialize<'de>>(s: &str) -> Result<T, Error> {
    let bytes = Base64UrlUnpadded::decode_vec(s).map_err(|_| Error::Base64)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Create an HS256 signed session token.
///
/// Signing is deterministic: the same claims and secret always produce the
/// same token string.
///
/// # Errors
///
/// Returns an error if the secret is unusable as an HMAC key or claims/header
/// JSON cannot be encoded.
pub fn sign_hs256(secret: &[u8], claims: &TokenClaims) -> Result<String, Error> {
    let header_b64 = b64e_json(&TokenHeader::hs256())?;
    let claims_b64 = b64e_json(claims)?;
    let signing_input = format!("{header_b64}.{claims_b64}");

    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| Error::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = Base64UrlUnpadded::encode_string(&signature);

    Ok(format!("{signing_input}.{signature_b64}"))
}

/// Verify an HS256 session token and return its decoded claims.
///
/// # Errors
///
/// Returns an error if:
/// - the token is malformed or contains invalid base64/json,
/// - the algorithm is not HS256,
/// - the signature does not match,
/// - the issuer is wrong or the token has expired at `now_unix_seconds`.
pub fn verify_hs256(
    token: &str,
    secret: &[u8],
    expected_issuer: &str,
    now_unix_seconds: i64,
) -> Result<TokenClaims, Error> {
    let mut parts = token.split('.');
    let header_b64 = parts.next().ok_or(Error::TokenFormat)?;
    let claims_b64 = parts.next().ok_or(Error::TokenFormat)?;
    let sig_b64 = parts.next().ok_or(Error::TokenFormat)?;
    if parts.next().is_some() {
        return Err(Error::TokenFormat);
    }

    let header: TokenHeader = b64d_json(header_b64)?;
    if header.alg != "HS256" {
        return Err(Error::UnsupportedAlg(header.alg));
    }

    let signing_input = format!("{header_b64}.{claims_b64}");
    let signature = Base64UrlUnpadded::decode_vec(sig_b64).map_err(|_| Error::Base64)?;
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|_| Error::InvalidKey)?;
    mac.update(signing_input.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| Error::InvalidSignature)?;

    let claims: TokenClaims = b64d_json(claims_b64)?;
    if claims.iss != expected_issuer {
        return Err(Error::InvalidIssuer);
    }
    if claims.exp <= now_unix_seconds {
        return Err(Error::Expired);
    }

    Ok(claims)
}

/// Best-effort unverified decode, for diagnostics only.
///
/// The signature is not checked; never use the result for authorization
/// decisions.
#[must_use]
pub fn decode_unverified(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let claims_b64 = parts.next()?;
    b64d_json(claims_b64).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-for-session-tokens";
    const ISSUER: &str = "campusphere";
    const NOW: i64 = 1_700_000_000;
    const WEEK_SECONDS: i64 = 7 * 24 * 60 * 60;

    fn test_claims() -> TokenClaims {
        TokenClaims {
            user_id: "student_01HWA7NVH0".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Student,
            iss: ISSUER.to_string(),
            iat: NOW,
            exp: NOW + WEEK_SECONDS,
        }
    }

    #[test]
    fn sign_and_verify_round_trip() -> Result<(), Error> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let verified = verify_hs256(&token, SECRET, ISSUER, NOW)?;
        assert_eq!(verified, test_claims());
        Ok(())
    }

    #[test]
    fn signing_is_deterministic() -> Result<(), Error> {
        let first = sign_hs256(SECRET, &test_claims())?;
        let second = sign_hs256(SECRET, &test_claims())?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn verify_succeeds_one_second_before_expiry() -> Result<(), Error> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let verified = verify_hs256(&token, SECRET, ISSUER, NOW + WEEK_SECONDS - 1)?;
        assert_eq!(verified.email, "alice@example.com");
        Ok(())
    }

    #[test]
    fn verify_fails_one_second_after_expiry() -> Result<(), Error> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let result = verify_hs256(&token, SECRET, ISSUER, NOW + WEEK_SECONDS + 1);
        assert!(matches!(result, Err(Error::Expired)));
        Ok(())
    }

    #[test]
    fn verify_fails_exactly_at_expiry() -> Result<(), Error> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let result = verify_hs256(&token, SECRET, ISSUER, NOW + WEEK_SECONDS);
        assert!(matches!(result, Err(Error::Expired)));
        Ok(())
    }

    #[test]
    fn rejects_wrong_secret() -> Result<(), Error> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let result = verify_hs256(&token, b"another-secret", ISSUER, NOW);
        assert!(matches!(result, Err(Error::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_wrong_issuer() -> Result<(), Error> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let result = verify_hs256(&token, SECRET, "someone-else", NOW);
        assert!(matches!(result, Err(Error::InvalidIssuer)));
        Ok(())
    }

    #[test]
    fn rejects_tampered_claims() -> Result<(), Error> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let mut forged = test_claims();
        forged.role = Role::Teacher;
        let forged_b64 = {
            let json = serde_json::to_vec(&forged)?;
            base64ct::Base64UrlUnpadded::encode_string(&json)
        };
        let mut parts = token.split('.');
        let header = parts.next().ok_or(Error::TokenFormat)?;
        let _claims = parts.next().ok_or(Error::TokenFormat)?;
        let signature = parts.next().ok_or(Error::TokenFormat)?;
        let tampered = format!("{header}.{forged_b64}.{signature}");

        let result = verify_hs256(&tampered, SECRET, ISSUER, NOW);
        assert!(matches!(result, Err(Error::InvalidSignature)));
        Ok(())
    }

    #[test]
    fn rejects_malformed_tokens() {
        for garbage in ["", "a", "a.b", "a.b.c.d", "!.!.!"] {
            assert!(verify_hs256(garbage, SECRET, ISSUER, NOW).is_err(), "{garbage}");
        }
    }

    #[test]
    fn decode_unverified_reads_claims_without_secret() -> Result<(), Error> {
        let token = sign_hs256(SECRET, &test_claims())?;
        let decoded = decode_unverified(&token);
        assert_eq!(decoded, Some(test_claims()));
        Ok(())
    }

    #[test]
    fn decode_unverified_returns_none_on_garbage() {
        assert_eq!(decode_unverified("not-a-token"), None);
        assert_eq!(decode_unverified("a.%%%.c"), None);
    }

    #[test]
    fn claims_use_wire_field_names() -> Result<(), Error> {
        let value = serde_json::to_value(test_claims())?;
        assert!(value.get("userId").is_some());
        assert_eq!(
            value.get("type").and_then(serde_json::Value::as_str),
            Some("student")
        );
        Ok(())
    }
}
