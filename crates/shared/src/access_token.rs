//! Signed, time-limited access tokens for gated course links.
//!
//! A token is a capability, not a credential: it is signed with the shared
//! application secret and carries its own expiry because there is no
//! revocation list. On the wire it travels as query parameters
//! (`courseId`, `userId`, `expiresAt`, `signature`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::crypto;

/// Default token lifetime in seconds (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Path of the endpoint that redeems access tokens.
pub const ACCESS_PATH: &str = "/api/v1/access/telegram";

/// Error type for token verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Token has expired")]
    Expired,

    #[error("Token signature is invalid")]
    BadSignature,
}

/// A signed access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub course_id: String,
    pub user_id: String,
    /// Unix seconds after which the token is no longer usable.
    pub expires_at: i64,
    /// Lowercase hex HMAC-SHA256 of the canonical payload.
    pub signature: String,
}

/// Identity pair proven by a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccess {
    pub course_id: String,
    pub user_id: String,
}

/// Raw query fields before validation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawToken {
    course_id: Option<String>,
    user_id: Option<String>,
    expires_at: Option<String>,
    signature: Option<String>,
}

fn token_payload(course_id: &str, user_id: &str, expires_at: i64) -> String {
    crypto::canonical_payload(&[course_id, user_id, &expires_at.to_string()])
}

/// Issues a token valid for `ttl_secs` from now.
pub fn issue(course_id: &str, user_id: &str, secret: &str, ttl_secs: i64) -> AccessToken {
    issue_at(course_id, user_id, secret, ttl_secs, Utc::now().timestamp())
}

/// Issues a token valid for `ttl_secs` from `now` (unix seconds).
pub fn issue_at(
    course_id: &str,
    user_id: &str,
    secret: &str,
    ttl_secs: i64,
    now: i64,
) -> AccessToken {
    let expires_at = now.saturating_add(ttl_secs);
    let signature = crypto::sign(secret, &token_payload(course_id, user_id, expires_at));

    AccessToken {
        course_id: course_id.to_string(),
        user_id: user_id.to_string(),
        expires_at,
        signature,
    }
}

impl AccessToken {
    /// Encodes the token as a form-urlencoded query string.
    pub fn to_query(&self) -> String {
        // Serializing a flat struct of strings and integers cannot fail.
        serde_urlencoded::to_string(self).unwrap_or_default()
    }
}

/// Builds the shareable access URL for `token` under `base_url`.
pub fn access_url(base_url: &str, token: &AccessToken) -> String {
    format!(
        "{}{}?{}",
        base_url.trim_end_matches('/'),
        ACCESS_PATH,
        token.to_query()
    )
}

/// Decodes and verifies a raw token against the current time.
///
/// `raw` may be a bare query string or a full URL carrying one.
pub fn parse_and_verify(raw: &str, secret: &str) -> Result<VerifiedAccess, TokenError> {
    parse_and_verify_at(raw, secret, Utc::now().timestamp())
}

/// Decodes and verifies a raw token against `now` (unix seconds).
pub fn parse_and_verify_at(
    raw: &str,
    secret: &str,
    now: i64,
) -> Result<VerifiedAccess, TokenError> {
    let token = parse(raw)?;
    verify_fields_at(&token, secret, now)
}

/// Decodes a token without verifying it.
pub fn parse(raw: &str) -> Result<AccessToken, TokenError> {
    let query = raw.split_once('?').map_or(raw, |(_, query)| query);
    let fields: RawToken = serde_urlencoded::from_str(query).map_err(|_| TokenError::Malformed)?;

    let course_id = fields.course_id.filter(|v| !v.is_empty());
    let user_id = fields.user_id.filter(|v| !v.is_empty());
    let signature = fields.signature.filter(|v| !v.is_empty());
    let expires_at = fields.expires_at.as_deref().and_then(parse_expiry);

    match (course_id, user_id, expires_at, signature) {
        (Some(course_id), Some(user_id), Some(expires_at), Some(signature)) => Ok(AccessToken {
            course_id,
            user_id,
            expires_at,
            signature,
        }),
        _ => Err(TokenError::Malformed),
    }
}

/// Parses expiry text, accepting only the form `issue` produces.
///
/// Signatures cover the decimal rendering of the expiry, so any other
/// spelling of the same number (`+17...`, `017...`) is rejected.
fn parse_expiry(raw: &str) -> Option<i64> {
    raw.parse::<i64>()
        .ok()
        .filter(|value| value.to_string() == raw)
}

/// Verifies an already decoded token against `now` (unix seconds).
///
/// Expiry is checked first; a token is usable while `now <= expires_at`.
pub fn verify_fields_at(
    token: &AccessToken,
    secret: &str,
    now: i64,
) -> Result<VerifiedAccess, TokenError> {
    if now > token.expires_at {
        return Err(TokenError::Expired);
    }

    let payload = token_payload(&token.course_id, &token.user_id, token.expires_at);
    if !crypto::verify(secret, &payload, &token.signature) {
        return Err(TokenError::BadSignature);
    }

    Ok(VerifiedAccess {
        course_id: token.course_id.clone(),
        user_id: token.user_id.clone(),
    })
}
