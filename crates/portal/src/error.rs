//! Portal-level error type.
//!
//! Only operations the caller invokes directly (login, logout) surface
//! errors. Failures inside the guard's check never do; they are converted
//! into session state and a redirect (see `services::session`). Config
//! loading has its own `ConfigError` and happens before anything else.

use thiserror::Error;

use newsstand_core::EmailError;

use crate::backend::BackendError;

/// Errors surfaced to callers of the portal session layer.
#[derive(Debug, Error)]
pub enum PortalError {
    /// The auth backend rejected or failed a call.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A supplied email address did not validate.
    #[error("invalid email: {0}")]
    Email(#[from] EmailError),
}

/// Result type alias for `PortalError`.
pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_error_message() {
        let err = PortalError::from(EmailError::MissingAtSymbol);
        assert_eq!(err.to_string(), "invalid email: email must contain an @ symbol");
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err = PortalError::from(BackendError::InvalidCredentials);
        assert_eq!(err.to_string(), "invalid email or password");
    }
}
