//! Authentication session: bearer token plus role.
//!
//! The browser storefront kept these in two small cookies (`token` and
//! `role`) with a seven-day max-age and `SameSite=Strict`. Here they live in
//! one JSON file under the data directory with the same lifetime rules, and
//! [`Session::cookie_headers`] renders the cookie pair for web front ends.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use vitrine_core::Role;

use crate::persist;

/// Session lifetime in days.
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

/// Cookie names used by web front ends.
pub mod cookie_names {
    /// Bearer token cookie.
    pub const TOKEN: &str = "token";
    /// Role cookie.
    pub const ROLE: &str = "role";
}

/// Errors from the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the session file failed.
    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the session failed.
    #[error("session serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An authenticated session.
///
/// `Debug` never prints the token.
#[derive(Debug, Clone)]
pub struct Session {
    token: SecretString,
    role: Role,
    issued_at: DateTime<Utc>,
}

/// On-disk form of a session.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    token: String,
    role: Role,
    issued_at: DateTime<Utc>,
}

impl Session {
    /// A session issued now.
    #[must_use]
    pub fn new(token: SecretString, role: Role) -> Self {
        Self::issued_at(token, role, Utc::now())
    }

    /// A session issued at a specific instant.
    #[must_use]
    pub const fn issued_at(token: SecretString, role: Role, issued_at: DateTime<Utc>) -> Self {
        Self {
            token,
            role,
            issued_at,
        }
    }

    /// The bearer token.
    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    /// The role string the API issued with the token.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// When the session stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + TimeDelta::days(SESSION_MAX_AGE_DAYS)
    }

    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Whether the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// `Set-Cookie` values for the token/role pair.
    #[must_use]
    pub fn cookie_headers(&self) -> [String; 2] {
        let max_age = TimeDelta::days(SESSION_MAX_AGE_DAYS).num_seconds();
        let attributes = format!("Path=/; Max-Age={max_age}; SameSite=Strict; Secure");
        [
            format!(
                "{}={}; {attributes}; HttpOnly",
                cookie_names::TOKEN,
                self.token.expose_secret()
            ),
            format!("{}={}; {attributes}", cookie_names::ROLE, self.role),
        ]
    }

    fn to_stored(&self) -> StoredSession {
        StoredSession {
            token: self.token.expose_secret().to_string(),
            role: self.role,
            issued_at: self.issued_at,
        }
    }

    fn from_stored(stored: StoredSession) -> Self {
        Self::issued_at(SecretString::from(stored.token), stored.role, stored.issued_at)
    }
}

/// Current session, mirrored to a file.
///
/// Cheaply cloneable; clones share the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    path: Option<PathBuf>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Load the session persisted at `path`.
    ///
    /// A missing, unreadable or expired session file yields a logged-out store.
    #[must_use]
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let current = match read_session(&path) {
            Ok(Some(session)) if !session.is_expired() => Some(session),
            Ok(Some(_)) => {
                debug!(path = %path.display(), "stored session expired");
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
                None
            }
        };

        Self::from_parts(Some(path), current)
    }

    /// A store that never touches the filesystem.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_parts(None, None)
    }

    fn from_parts(path: Option<PathBuf>, current: Option<Session>) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                path,
                current: RwLock::new(current),
            }),
        }
    }

    /// The current session, if logged in and not expired.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .filter(|session| !session.is_expired())
    }

    /// Replace the current session and persist it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be written. The in-memory
    /// session is updated either way.
    pub fn save(&self, session: Session) -> Result<(), SessionError> {
        let stored = serde_json::to_vec_pretty(&session.to_stored());
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);

        if let Some(path) = &self.inner.path {
            persist::write_atomic(path, &stored?)?;
        }
        Ok(())
    }

    /// Log out locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file exists but cannot be removed.
    pub fn clear(&self) -> Result<(), SessionError> {
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;

        if let Some(path) = &self.inner.path {
            persist::remove_if_exists(path)?;
        }
        Ok(())
    }
}

fn read_session(path: &Path) -> Result<Option<Session>, SessionError> {
    let Some(bytes) = persist::read_optional(path)? else {
        return Ok(None);
    };
    let stored: StoredSession = serde_json::from_slice(&bytes)?;
    Ok(Some(Session::from_stored(stored)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session::new(SecretString::from("tok_abc123"), role)
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", session(Role::Customer));
        assert!(!debug.contains("tok_abc123"));
    }

    #[test]
    fn test_expiry_after_max_age() {
        let issued = Utc::now() - TimeDelta::days(SESSION_MAX_AGE_DAYS) - TimeDelta::seconds(1);
        let old = Session::issued_at(SecretString::from("t"), Role::Customer, issued);
        assert!(old.is_expired());
        assert!(!session(Role::Customer).is_expired());
    }

    #[test]
    fn test_cookie_headers_are_strict() {
        let [token, role] = session(Role::Admin).cookie_headers();
        assert!(token.starts_with("token=tok_abc123;"));
        assert!(token.contains("SameSite=Strict"));
        assert!(token.contains("Max-Age=604800"));
        assert!(token.contains("HttpOnly"));
        assert!(role.starts_with("role=admin;"));
    }

    #[test]
    fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let store = SessionStore::load(&path);
        assert!(store.current().is_none());

        store.save(session(Role::Admin)).unwrap();
        let reloaded = SessionStore::load(&path);
        let current = reloaded.current().unwrap();
        assert!(current.is_admin());
        assert_eq!(current.token().expose_secret(), "tok_abc123");

        reloaded.clear().unwrap();
        assert!(reloaded.current().is_none());
        assert!(SessionStore::load(&path).current().is_none());
    }

    #[test]
    fn test_expired_file_loads_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let issued = Utc::now() - TimeDelta::days(30);
        SessionStore::load(&path)
            .save(Session::issued_at(SecretString::from("t"), Role::Customer, issued))
            .unwrap();

        assert!(SessionStore::load(&path).current().is_none());
    }

    #[test]
    fn test_corrupt_file_loads_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(SessionStore::load(&path).current().is_none());
    }
}
