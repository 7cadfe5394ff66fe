//! Login, registration and logout.

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use super::types::{AuthPayload, LoginRequest, RegisterRequest};
use super::{ApiClient, ApiError};
use crate::notify::Toast;
use crate::session::{Session, SessionError};

impl ApiClient {
    /// Log in and store the issued session.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Session, ApiError> {
        let body = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        let response = self.post("auth/login", &body).await?;
        let payload: AuthPayload = self.data(response)?;
        Ok(self.start_session(payload))
    }

    /// Create an account and store the issued session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration or the request fails.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<Session, ApiError> {
        let body = RegisterRequest {
            name,
            email,
            password: password.expose_secret(),
        };
        let response = self.post("auth/register", &body).await?;
        let payload: AuthPayload = self.data(response)?;
        Ok(self.start_session(payload))
    }

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be removed.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.inner.sessions.clear()?;
        info!("Logged out");
        Ok(())
    }

    fn start_session(&self, payload: AuthPayload) -> Session {
        let session = Session::new(SecretString::from(payload.token), payload.role);

        // The in-memory session is already active; a failed write only
        // means the next process starts logged out.
        if let Err(e) = self.inner.sessions.save(session.clone()) {
            warn!(error = %e, "Failed to persist session");
        }

        match &payload.user {
            Some(user) => {
                info!(role = %session.role(), user_id = %user.id, "Session started");
                self.inner
                    .notifier
                    .notify(Toast::success(format!("Olá, {}!", user.name)));
            }
            None => info!(role = %session.role(), "Session started"),
        }
        session
    }
}
