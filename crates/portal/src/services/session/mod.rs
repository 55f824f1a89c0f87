//! Session guard.
//!
//! Wraps protected navigation: before the UI renders anything under
//! `/admin`, [`SessionGuard::check`] makes sure the session holds a
//! currently-valid access token and an admin role, refreshing and
//! re-resolving identity as needed, and answers with render-or-redirect.
//!
//! The check is a plain async function of `(path, trigger)`. The caller
//! subscribes to path changes and trigger bumps, shows its loading state
//! while the returned future is pending, and acts on the settled
//! [`GateOutcome`]. No failure inside the check escapes as an error; every
//! failure becomes session state and, ultimately, a redirect.

use std::sync::Mutex;

use secrecy::SecretString;

use newsstand_core::{Email, UserId, UserRole};

use crate::backend::AuthBackend;
use crate::claims;
use crate::error::PortalError;
use crate::routes::{self, GateOutcome, RedirectTarget};
use crate::store::SessionStore;

/// How a check resolved authentication, before role gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthResolution {
    /// A valid token is held (pre-existing or freshly refreshed).
    Authorized { user_id: UserId },
    /// No valid token could be obtained.
    Unauthorized,
}

/// Settled result of a previous check, so re-running the guard with the
/// same `(path, trigger)` pair costs no extra network calls.
struct CheckMemo {
    path: String,
    trigger: u64,
    outcome: GateOutcome,
}

/// The session guard.
///
/// Owns the session store and the auth backend seam. One instance is shared
/// by every protected subtree; clones of the store observe the same state.
pub struct SessionGuard<B> {
    backend: B,
    store: SessionStore,
    memo: Mutex<Option<CheckMemo>>,
}

impl<B: AuthBackend> SessionGuard<B> {
    /// Create a guard over `store`, talking to `backend`.
    #[must_use]
    pub fn new(backend: B, store: SessionStore) -> Self {
        Self {
            backend,
            store,
            memo: Mutex::new(None),
        }
    }

    /// The guard's session store.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Run the per-navigation check for `path`.
    ///
    /// Public routes render unconditionally and cost nothing. Protected
    /// routes resolve authentication (decode, refresh if needed), then the
    /// role, then gate. At most one refresh call and one role fetch happen
    /// per `(path, trigger)` pair.
    ///
    /// If the trigger is bumped while this check is in flight, the check's
    /// results are discarded rather than overwriting newer session state;
    /// the bump itself schedules the re-check.
    pub async fn check(&self, path: &str) -> GateOutcome {
        if !routes::is_protected(path) {
            return GateOutcome::Render;
        }

        let trigger = self.store.trigger();
        if let Some(outcome) = self.memoized(path, trigger) {
            return outcome;
        }

        let resolution = self.authenticate(trigger).await;

        let outcome = match resolution {
            AuthResolution::Unauthorized => GateOutcome::Redirect(RedirectTarget::Login),
            AuthResolution::Authorized { user_id } => {
                let role = self.resolve_role(trigger, user_id).await;
                if role.is_some_and(UserRole::is_admin) {
                    GateOutcome::Render
                } else {
                    GateOutcome::Redirect(RedirectTarget::Home)
                }
            }
        };

        self.memoize(path, trigger, outcome);
        outcome
    }

    /// Log in with email and password.
    ///
    /// On success the session holds the new token and identity, and the
    /// trigger is bumped so any guarded subtree re-evaluates. The backend
    /// sets the HTTP-only refresh cookie on the same response.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError`] for a malformed email, rejected credentials,
    /// or a failed call. The session is left untouched on failure.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<(), PortalError> {
        let email = Email::parse(email)?;
        let grant = self.backend.login(&email, &password).await?;

        // The backend may omit the role from the grant; authors are the
        // default account kind.
        let role = grant.role.unwrap_or(UserRole::Author);

        self.store.apply(|session| {
            session.access_token = Some(grant.access);
            session.user_id = Some(grant.user_id);
            session.user_role = Some(role);
            session.is_authorized = true;
        });
        self.store.bump_trigger();

        tracing::info!(user_id = %grant.user_id, "logged in");
        Ok(())
    }

    /// Log out: drop the refresh cookie server-side, clear the session,
    /// and bump the trigger.
    ///
    /// A failed backend call is logged and does not keep the user logged
    /// in locally.
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            tracing::warn!(error = %e, "backend logout failed, clearing session anyway");
        }

        self.store.clear();
        self.store.bump_trigger();
        tracing::info!("logged out");
    }

    /// Resolve authentication for this check: reuse a valid stored token,
    /// otherwise refresh. Missing, unreadable, and expired tokens all take
    /// the refresh path.
    async fn authenticate(&self, trigger: u64) -> AuthResolution {
        let session = self.store.session();

        let Some(token) = session.access_token else {
            return self.refresh_session(trigger).await;
        };

        match claims::decode_unverified(&token) {
            Err(e) => {
                tracing::debug!(error = %e, "stored token unreadable, attempting refresh");
                self.refresh_session(trigger).await
            }
            Ok(token_claims) if token_claims.is_expired() => {
                tracing::debug!("access token expired, attempting refresh");
                self.refresh_session(trigger).await
            }
            Ok(token_claims) => {
                self.commit_authorized(trigger, None, token_claims.user_id);
                AuthResolution::Authorized {
                    user_id: token_claims.user_id,
                }
            }
        }
    }

    /// Exchange the refresh cookie for a new access token. Exactly one
    /// attempt; a failure leaves the session unauthorized until the next
    /// trigger.
    async fn refresh_session(&self, trigger: u64) -> AuthResolution {
        let access = match self.backend.refresh().await {
            Ok(access) => access,
            Err(e) => {
                tracing::warn!(error = %e, "token refresh failed");
                self.commit_unauthorized(trigger);
                return AuthResolution::Unauthorized;
            }
        };

        match claims::decode_unverified(&access) {
            Ok(token_claims) => {
                let user_id = token_claims.user_id;
                self.commit_authorized(trigger, Some(access), user_id);
                AuthResolution::Authorized { user_id }
            }
            Err(e) => {
                // A refresh that hands back an unreadable token is a failed
                // refresh.
                tracing::warn!(error = %e, "refreshed token is unreadable");
                self.commit_unauthorized(trigger);
                AuthResolution::Unauthorized
            }
        }
    }

    /// Fetch the role for `user_id` and store it. On failure the stored
    /// role (already cleared if the user changed) is used as-is: gating
    /// degrades toward "not admin", authorization is untouched.
    async fn resolve_role(&self, trigger: u64, user_id: UserId) -> Option<UserRole> {
        match self.backend.fetch_role(user_id).await {
            Ok(role) => {
                self.store
                    .apply_if_current(trigger, |session| session.user_role = Some(role));
                Some(role)
            }
            Err(e) => {
                tracing::warn!(error = %e, %user_id, "failed to fetch user role");
                self.store.session().user_role
            }
        }
    }

    fn commit_authorized(&self, trigger: u64, new_token: Option<String>, user_id: UserId) {
        self.store.apply_if_current(trigger, |session| {
            // Role belongs to a user id; invalidate it when identity moves.
            if session.user_id != Some(user_id) {
                session.user_role = None;
            }
            if let Some(token) = new_token {
                session.access_token = Some(token);
            }
            session.user_id = Some(user_id);
            session.is_authorized = true;
        });
    }

    fn commit_unauthorized(&self, trigger: u64) {
        self.store
            .apply_if_current(trigger, |session| session.is_authorized = false);
    }

    fn memoized(&self, path: &str, trigger: u64) -> Option<GateOutcome> {
        let memo = self.memo.lock().expect("memo lock poisoned");
        memo.as_ref()
            .filter(|m| m.path == path && m.trigger == trigger)
            .map(|m| m.outcome)
    }

    fn memoize(&self, path: &str, trigger: u64, outcome: GateOutcome) {
        // A stale check's outcome is not worth remembering; the bump that
        // superseded it schedules a fresh one.
        if self.store.trigger() != trigger {
            return;
        }
        *self.memo.lock().expect("memo lock poisoned") = Some(CheckMemo {
            path: path.to_string(),
            trigger,
            outcome,
        });
    }
}
