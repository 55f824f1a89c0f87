//! Session state.
//!
//! The one mutable, persisted record of who the portal believes is logged
//! in. All components read it; only the guard and explicit login/logout
//! write it.

use serde::{Deserialize, Serialize};

use newsstand_core::{UserId, UserRole};

/// Persisted session fields.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Current access token, if any. Readable-but-unverified JWT.
    pub access_token: Option<String>,
    /// User id decoded from the token or returned by login.
    pub user_id: Option<UserId>,
    /// Role fetched from the backend; only meaningful while authorized.
    pub user_role: Option<UserRole>,
    /// True only after a successful validity check, refresh, or login.
    pub is_authorized: bool,
}

impl Session {
    /// An empty, unauthorized session.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            access_token: None,
            user_id: None,
            user_role: None,
            is_authorized: false,
        }
    }

    /// Reset every field. The session is cleared, never destroyed.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("user_id", &self.user_id)
            .field("user_role", &self.user_role)
            .field("is_authorized", &self.is_authorized)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unauthorized() {
        let session = Session::empty();
        assert!(!session.is_authorized);
        assert!(session.user_role.is_none());
        assert!(session.access_token.is_none());
    }

    #[test]
    fn test_clear_resets_all_fields() {
        let mut session = Session {
            access_token: Some("token".to_string()),
            user_id: Some(UserId::new(7)),
            user_role: Some(UserRole::Admin),
            is_authorized: true,
        };
        session.clear();
        assert_eq!(session, Session::empty());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session {
            access_token: Some("very-secret-token".to_string()),
            ..Session::empty()
        };
        let debug = format!("{session:?}");
        assert!(!debug.contains("very-secret-token"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_serde_roundtrip() {
        let session = Session {
            access_token: Some("tok".to_string()),
            user_id: Some(UserId::new(3)),
            user_role: Some(UserRole::Author),
            is_authorized: true,
        };
        let json = serde_json::to_string(&session).unwrap();
        let parsed: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }
}
