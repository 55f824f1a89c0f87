//! User role returned by the portal backend.

use serde::{Deserialize, Serialize};

/// Role attribute fetched from `GET /api/user/{id}/role/`.
///
/// The backend stores roles as lowercase strings. Anything the client does
/// not recognize deserializes to [`UserRole::Unknown`] and is treated the
/// same as a non-admin role by route gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Author,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    /// Whether this role grants access to `/admin` routes.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Lowercase wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Author => "author",
            Self::Unknown => "unknown",
        }
    }
}

impl core::fmt::Display for UserRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
