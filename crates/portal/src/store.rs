//! Shared session store with pluggable persistence.
//!
//! The store is the only shared mutable state in the portal. Reads hand out
//! a snapshot; writes go through [`SessionStore::apply`] so the session is
//! never observed half-updated, and a gated decision is always made against
//! a fully committed state.
//!
//! The trigger counter is the session's invalidation signal: login, logout,
//! and external invalidation bump it, and the guard re-evaluates on change.
//! It is deliberately not persisted.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};

use thiserror::Error;

use crate::models::Session;

/// Errors from session persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Where the session survives between runs.
///
/// Persistence failures are logged and never block the session itself; a
/// session that cannot be saved still works for the current run.
pub trait SessionPersist: Send + Sync {
    /// Load the persisted session, if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the stored data exists but cannot be read.
    fn load(&self) -> Result<Option<Session>, StoreError>;

    /// Persist the current session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the session cannot be written.
    fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Remove any persisted session.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if removal fails for a reason other than the
    /// data already being gone.
    fn clear(&self) -> Result<(), StoreError>;
}

/// JSON-file persistence.
#[derive(Debug, Clone)]
pub struct FilePersist {
    path: PathBuf,
}

impl FilePersist {
    /// Persist sessions at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionPersist for FilePersist {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        let data = match std::fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(session)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory persistence for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPersist {
    slot: Mutex<Option<Session>>,
}

impl MemoryPersist {
    /// An empty in-memory slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionPersist for MemoryPersist {
    fn load(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.slot.lock().expect("session slot poisoned").clone())
    }

    fn save(&self, session: &Session) -> Result<(), StoreError> {
        *self.slot.lock().expect("session slot poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().expect("session slot poisoned") = None;
        Ok(())
    }
}

/// Shared handle to the session.
///
/// Cheaply cloneable via `Arc`; all clones observe the same state and
/// trigger counter.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: RwLock<Session>,
    trigger: AtomicU64,
    persist: Box<dyn SessionPersist>,
}

impl SessionStore {
    /// Create a store, hydrating from `persist` when a session was saved.
    ///
    /// An unreadable persisted session is logged and treated as absent; a
    /// bad file must not lock the user out of starting fresh.
    #[must_use]
    pub fn new(persist: impl SessionPersist + 'static) -> Self {
        let initial = match persist.load() {
            Ok(Some(session)) => session,
            Ok(None) => Session::empty(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to hydrate persisted session, starting empty");
                Session::empty()
            }
        };

        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(initial),
                trigger: AtomicU64::new(0),
                persist: Box::new(persist),
            }),
        }
    }

    /// An in-memory store with no persisted hydration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryPersist::new())
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.inner
            .state
            .read()
            .expect("session lock poisoned")
            .clone()
    }

    /// Current value of the invalidation counter.
    #[must_use]
    pub fn trigger(&self) -> u64 {
        self.inner.trigger.load(Ordering::SeqCst)
    }

    /// Bump the invalidation counter, superseding any in-flight check.
    ///
    /// Returns the new value.
    pub fn bump_trigger(&self) -> u64 {
        self.inner.trigger.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Mutate the session in one atomic commit and persist the result.
    pub fn apply(&self, f: impl FnOnce(&mut Session)) {
        let mut state = self.inner.state.write().expect("session lock poisoned");
        f(&mut state);
        if let Err(e) = self.inner.persist.save(&state) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    /// Like [`Self::apply`], but only if the trigger still equals
    /// `observed_trigger`.
    ///
    /// A check that started under an older trigger uses this so its results
    /// cannot overwrite state written by a newer login/logout/check.
    /// Returns whether the commit happened.
    pub fn apply_if_current(&self, observed_trigger: u64, f: impl FnOnce(&mut Session)) -> bool {
        let mut state = self.inner.state.write().expect("session lock poisoned");
        if self.inner.trigger.load(Ordering::SeqCst) != observed_trigger {
            return false;
        }
        f(&mut state);
        if let Err(e) = self.inner.persist.save(&state) {
            tracing::warn!(error = %e, "failed to persist session");
        }
        true
    }

    /// Clear the session and its persisted copy.
    pub fn clear(&self) {
        let mut state = self.inner.state.write().expect("session lock poisoned");
        state.clear();
        if let Err(e) = self.inner.persist.clear() {
            tracing::warn!(error = %e, "failed to clear persisted session");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use newsstand_core::{UserId, UserRole};

    fn sample_session() -> Session {
        Session {
            access_token: Some("tok".to_string()),
            user_id: Some(UserId::new(7)),
            user_role: Some(UserRole::Admin),
            is_authorized: true,
        }
    }

    #[test]
    fn test_apply_persists() {
        let store = SessionStore::in_memory();
        store.apply(|s| *s = sample_session());
        assert_eq!(store.session(), sample_session());
    }

    #[test]
    fn test_bump_trigger_monotonic() {
        let store = SessionStore::in_memory();
        assert_eq!(store.trigger(), 0);
        assert_eq!(store.bump_trigger(), 1);
        assert_eq!(store.bump_trigger(), 2);
        assert_eq!(store.trigger(), 2);
    }

    #[test]
    fn test_apply_if_current_rejects_stale_writer() {
        let store = SessionStore::in_memory();
        let observed = store.trigger();
        store.bump_trigger();

        let committed = store.apply_if_current(observed, |s| *s = sample_session());
        assert!(!committed);
        assert_eq!(store.session(), Session::empty());
    }

    #[test]
    fn test_apply_if_current_commits_when_unchanged() {
        let store = SessionStore::in_memory();
        let observed = store.trigger();

        let committed = store.apply_if_current(observed, |s| *s = sample_session());
        assert!(committed);
        assert!(store.session().is_authorized);
    }

    #[test]
    fn test_clear_wipes_state_and_persistence() {
        let store = SessionStore::in_memory();
        store.apply(|s| *s = sample_session());
        store.clear();
        assert_eq!(store.session(), Session::empty());
    }

    #[test]
    fn test_file_persist_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let persist = FilePersist::new(&path);
        persist.save(&sample_session()).unwrap();
        assert_eq!(persist.load().unwrap(), Some(sample_session()));

        persist.clear().unwrap();
        assert_eq!(persist.load().unwrap(), None);
        // Clearing twice is fine.
        persist.clear().unwrap();
    }

    #[test]
    fn test_file_persist_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let persist = FilePersist::new(dir.path().join("absent.json"));
        assert_eq!(persist.load().unwrap(), None);
    }

    #[test]
    fn test_store_hydrates_from_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        FilePersist::new(&path).save(&sample_session()).unwrap();

        let store = SessionStore::new(FilePersist::new(&path));
        assert_eq!(store.session(), sample_session());
    }

    #[test]
    fn test_store_tolerates_corrupt_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let store = SessionStore::new(FilePersist::new(&path));
        assert_eq!(store.session(), Session::empty());
    }
}
