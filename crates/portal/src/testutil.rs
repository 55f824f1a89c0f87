//! Shared helpers for unit tests.

#![allow(clippy::unwrap_used)]

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Build an unsigned-but-well-formed token for a given payload.
pub fn token_with_payload(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
    format!("{header}.{body}.sig")
}

/// Token carrying `exp` and `user_id`, the way the backend issues them.
pub fn token_for(user_id: i32, exp: i64) -> String {
    token_with_payload(&serde_json::json!({
        "exp": exp,
        "user_id": user_id,
        "token_type": "access",
    }))
}
