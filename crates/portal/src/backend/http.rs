//! HTTP implementation of the auth backend.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::StatusCode;
use reqwest_cookie_store::{CookieStore, CookieStoreMutex};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use newsstand_core::{Email, UserId, UserRole};

use super::{AuthBackend, BackendError, LoginGrant, RefreshResponse, RoleResponse};
use crate::config::PortalConfig;

/// Wire paths of the auth endpoints, relative to the configured base URL.
const LOGIN_PATH: &str = "/api/token/";
const REFRESH_PATH: &str = "/api/token/refresh/";
const LOGOUT_PATH: &str = "/api/logout/";

fn role_path(user_id: UserId) -> String {
    format!("/api/user/{user_id}/role/")
}

/// Reqwest-backed client for the portal's auth endpoints.
///
/// Built with a cookie store so the HTTP-only `refresh_token` cookie set by
/// login is sent back on refresh and cleared by logout. The jar is persisted
/// to the configured cookie file after every cookie-bearing call, so the
/// refresh credential survives between short-lived processes.
#[derive(Clone)]
pub struct HttpAuthBackend {
    inner: Arc<HttpAuthBackendInner>,
}

struct HttpAuthBackendInner {
    client: reqwest::Client,
    base_url: String,
    cookies: Arc<CookieStoreMutex>,
    cookie_file: PathBuf,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

impl HttpAuthBackend {
    /// Create a client for the backend named in `config`, hydrating the
    /// cookie jar from the configured cookie file when one was saved.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &PortalConfig) -> Result<Self, BackendError> {
        let cookies = Arc::new(CookieStoreMutex::new(load_cookies(&config.cookie_file)));
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpAuthBackendInner {
                client,
                base_url: config.api_base_url.clone(),
                cookies,
                cookie_file: config.cookie_file.clone(),
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Write the jar back to disk. Called after every call that can set or
    /// clear the refresh cookie; failures are logged, the session itself
    /// keeps working for the current process.
    fn persist_cookies(&self) {
        let file = match File::create(&self.inner.cookie_file) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(error = %e, "failed to create cookie file");
                return;
            }
        };

        let store = self.inner.cookies.lock().expect("cookie store poisoned");
        if let Err(e) = store.save_incl_expired_and_nonpersistent_json(&mut BufWriter::new(file)) {
            tracing::warn!(error = %e, "failed to persist cookie jar");
        }
    }
}

/// Load the persisted cookie jar. Missing or unreadable files start an
/// empty jar; a bad cookie file must not block login.
fn load_cookies(path: &Path) -> CookieStore {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return CookieStore::default(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to open cookie file, starting with an empty jar");
            return CookieStore::default();
        }
    };

    CookieStore::load_json_all(BufReader::new(file)).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "cookie file is unreadable, starting with an empty jar");
        CookieStore::default()
    })
}

impl AuthBackend for HttpAuthBackend {
    async fn refresh(&self) -> Result<String, BackendError> {
        // Empty body; the refresh token rides in the cookie store.
        let response = self
            .inner
            .client
            .post(self.endpoint(REFRESH_PATH))
            .send()
            .await?;
        self.persist_cookies();

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BackendError::Status { status });
        }

        let body: RefreshResponse = response.json().await?;
        Ok(body.access)
    }

    async fn fetch_role(&self, user_id: UserId) -> Result<UserRole, BackendError> {
        let response = self
            .inner
            .client
            .get(self.endpoint(&role_path(user_id)))
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BackendError::Status { status });
        }

        let body: RoleResponse = response.json().await?;
        Ok(body.role)
    }

    async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<LoginGrant, BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(LOGIN_PATH))
            .json(&LoginRequest {
                email: email.as_str(),
                password: password.expose_secret(),
            })
            .send()
            .await?;
        self.persist_cookies();

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::InvalidCredentials);
        }
        if status != StatusCode::OK {
            return Err(BackendError::Status { status });
        }

        Ok(response.json().await?)
    }

    async fn logout(&self) -> Result<(), BackendError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(LOGOUT_PATH))
            .send()
            .await?;
        self.persist_cookies();

        let status = response.status();
        if status != StatusCode::OK {
            return Err(BackendError::Status { status });
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reqwest_cookie_store::RawCookie;

    fn test_config() -> PortalConfig {
        PortalConfig {
            api_base_url: "https://api.example.com".to_string(),
            session_file: PathBuf::from(".newsstand-session.json"),
            cookie_file: PathBuf::from(".newsstand-cookies.json"),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_endpoint_joins_paths() {
        let backend = HttpAuthBackend::new(&test_config()).expect("client");
        assert_eq!(
            backend.endpoint(REFRESH_PATH),
            "https://api.example.com/api/token/refresh/"
        );
        assert_eq!(
            backend.endpoint(&role_path(UserId::new(7))),
            "https://api.example.com/api/user/7/role/"
        );
    }

    #[test]
    fn test_logout_uses_top_level_logout_path() {
        let backend = HttpAuthBackend::new(&test_config()).expect("client");
        assert_eq!(
            backend.endpoint(LOGOUT_PATH),
            "https://api.example.com/api/logout/"
        );
    }

    #[test]
    fn test_cookie_jar_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        let url = url::Url::parse("https://api.example.com/").unwrap();

        let mut store = CookieStore::default();
        store
            .insert_raw(
                &RawCookie::parse("refresh_token=abc; Path=/; HttpOnly").unwrap(),
                &url,
            )
            .unwrap();
        store
            .save_incl_expired_and_nonpersistent_json(&mut BufWriter::new(
                File::create(&path).unwrap(),
            ))
            .unwrap();

        let loaded = load_cookies(&path);
        let cookie = loaded.get("api.example.com", "/", "refresh_token");
        assert_eq!(cookie.map(|c| c.value()), Some("abc"));
    }

    #[test]
    fn test_missing_cookie_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_cookies(&dir.path().join("absent.json"));
        assert_eq!(loaded.iter_any().count(), 0);
    }

    #[test]
    fn test_corrupt_cookie_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let loaded = load_cookies(&path);
        assert_eq!(loaded.iter_any().count(), 0);
    }
}
