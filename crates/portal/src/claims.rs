//! Unverified access-token claim reading.
//!
//! The portal only *reads* token claims (expiry, user id) to decide whether
//! a refresh is needed and which user to look up. Signatures are not checked
//! here; the backend validates tokens on every protected call. Claim reading
//! is UX gating, not a security boundary.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use newsstand_core::UserId;

/// Errors that can occur when reading a token's payload.
#[derive(Debug, Error)]
pub enum ClaimsError {
    /// The token does not have the three dot-separated JWT segments.
    #[error("token is not a three-segment JWT")]
    Malformed,
    /// The payload segment is not valid base64url.
    #[error("token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The payload decodes but is not the expected JSON shape.
    #[error("token payload is not valid claims JSON: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Claims the portal reads from an access token.
///
/// The backend embeds more fields; only these two matter client-side.
/// Unknown fields are ignored.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct AccessClaims {
    /// Expiry as Unix seconds.
    pub exp: i64,
    /// Owning user's id.
    pub user_id: UserId,
}

impl AccessClaims {
    /// Whether the token was expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp < now.timestamp()
    }

    /// Whether the token is expired right now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Decode the payload segment of `token` without verifying its signature.
///
/// # Errors
///
/// Returns [`ClaimsError`] if the token is not a three-segment JWT, the
/// payload is not base64url, or the JSON lacks `exp`/`user_id`.
pub fn decode_unverified(token: &str) -> Result<AccessClaims, ClaimsError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::Malformed);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload)?;
    let claims = serde_json::from_slice(&bytes)?;
    Ok(claims)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testutil::{token_for, token_with_payload};

    #[test]
    fn test_decode_valid_token() {
        let exp = Utc::now().timestamp() + 3600;
        let claims = decode_unverified(&token_for(7, exp)).unwrap();
        assert_eq!(claims.user_id, UserId::new(7));
        assert_eq!(claims.exp, exp);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_decode_expired_token() {
        let claims = decode_unverified(&token_for(7, Utc::now().timestamp() - 60)).unwrap();
        assert!(claims.is_expired());
    }

    #[test]
    fn test_expiry_boundary_uses_seconds() {
        let now = Utc::now();
        let claims = decode_unverified(&token_for(1, now.timestamp())).unwrap();
        // exp == now is not yet expired; the check is strict less-than.
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn test_decode_not_a_jwt() {
        assert!(matches!(
            decode_unverified("garbage"),
            Err(ClaimsError::Malformed)
        ));
        assert!(matches!(
            decode_unverified("a.b.c.d"),
            Err(ClaimsError::Malformed)
        ));
    }

    #[test]
    fn test_decode_bad_base64() {
        assert!(matches!(
            decode_unverified("aGVhZGVy.!!!not-base64!!!.sig"),
            Err(ClaimsError::Base64(_))
        ));
    }

    #[test]
    fn test_decode_missing_claims() {
        let token = token_with_payload(&serde_json::json!({"sub": "nobody"}));
        assert!(matches!(
            decode_unverified(&token),
            Err(ClaimsError::Payload(_))
        ));
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let token = token_with_payload(&serde_json::json!({
            "exp": Utc::now().timestamp() + 10,
            "user_id": 3,
            "iat": 0,
            "jti": "abc",
        }));
        assert!(decode_unverified(&token).is_ok());
    }
}
