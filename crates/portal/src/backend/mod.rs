//! Auth backend client.
//!
//! The portal backend is an external collaborator reached over plain REST.
//! [`AuthBackend`] is the seam the session guard depends on; the production
//! implementation is [`HttpAuthBackend`], and tests substitute a fake.

mod http;

pub use http::HttpAuthBackend;

use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;

use newsstand_core::{Email, UserId, UserRole};

/// Errors from the auth backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connect, timeout, body decode).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}")]
    Status {
        /// HTTP status the backend responded with.
        status: reqwest::StatusCode,
    },

    /// Login rejected the supplied credentials.
    #[error("invalid email or password")]
    InvalidCredentials,
}

/// Body of `POST /api/token/refresh/` on success.
///
/// The backend also includes a human-readable `message`; only the token
/// matters here.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    /// Fresh access token.
    pub access: String,
}

/// Body of `GET /api/user/{id}/role/`.
#[derive(Debug, Deserialize)]
pub struct RoleResponse {
    /// The user's role attribute.
    pub role: UserRole,
}

/// Successful login grant from `POST /api/token/`.
///
/// The refresh token itself travels in an HTTP-only cookie set by the same
/// response; the client never sees or stores it.
#[derive(Debug, Deserialize)]
pub struct LoginGrant {
    /// Access token for the new session.
    pub access: String,
    /// Id of the authenticated user.
    pub user_id: UserId,
    /// Role, when the backend includes it in the grant.
    pub role: Option<UserRole>,
}

/// Operations the session layer needs from the auth backend.
pub trait AuthBackend: Send + Sync {
    /// Exchange the refresh cookie for a new access token.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the cookie is missing/expired (the
    /// backend answers 401) or the call fails outright.
    fn refresh(&self) -> impl Future<Output = Result<String, BackendError>> + Send;

    /// Fetch the role attribute for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on any non-200 answer or transport failure.
    fn fetch_role(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<UserRole, BackendError>> + Send;

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::InvalidCredentials`] when the backend rejects
    /// the credentials, other [`BackendError`] variants otherwise.
    fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> impl Future<Output = Result<LoginGrant, BackendError>> + Send;

    /// Tell the backend to drop the refresh cookie.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] on any non-200 answer or transport failure.
    fn logout(&self) -> impl Future<Output = Result<(), BackendError>> + Send;
}
