//! Session commands: login, logout, whoami, check.

use secrecy::SecretString;

use newsstand_portal::backend::HttpAuthBackend;
use newsstand_portal::config::PortalConfig;
use newsstand_portal::error::Result;
use newsstand_portal::routes::GateOutcome;
use newsstand_portal::services::session::SessionGuard;
use newsstand_portal::store::{FilePersist, SessionStore};

/// Build the guard over the configured session file and backend.
fn build_guard(config: &PortalConfig) -> Result<SessionGuard<HttpAuthBackend>> {
    let store = SessionStore::new(FilePersist::new(&config.session_file));
    let backend = HttpAuthBackend::new(config)?;
    Ok(SessionGuard::new(backend, store))
}

/// Log in and persist the session.
pub async fn login(config: &PortalConfig, email: &str, password: String) -> Result<()> {
    let guard = build_guard(config)?;
    guard.login(email, SecretString::from(password)).await?;

    println!("Logged in as {email}");
    Ok(())
}

/// Log out and clear the persisted session.
pub async fn logout(config: &PortalConfig) -> Result<()> {
    let guard = build_guard(config)?;
    guard.logout().await;

    println!("Logged out");
    Ok(())
}

/// Print the stored session.
pub fn whoami(config: &PortalConfig) -> Result<()> {
    let store = SessionStore::new(FilePersist::new(&config.session_file));
    let session = store.session();

    match session.user_id {
        Some(user_id) => {
            let role = session
                .user_role
                .map_or("(no role)", newsstand_core::UserRole::as_str);
            println!(
                "user {user_id}  role {role}  authorized {}",
                session.is_authorized
            );
        }
        None => println!("Not logged in"),
    }
    Ok(())
}

/// Run the guard for `path` and report the settled outcome.
pub async fn check(config: &PortalConfig, path: &str) -> Result<()> {
    let guard = build_guard(config)?;

    match guard.check(path).await {
        GateOutcome::Render => println!("{path}: render"),
        GateOutcome::Redirect(target) => println!("{path}: redirect -> {}", target.path()),
    }
    Ok(())
}
