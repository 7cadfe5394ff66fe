//! REST client for the store backend.
//!
//! Every request goes through one pipeline: the bearer token from the
//! current session is attached, idempotent requests are retried with
//! exponential backoff, and the final failure is classified, logged and
//! surfaced to the shopper as a toast. A 401 also drops the stored session.
//!
//! Catalog reads (products, lookbook) are cached with `moka` (5-minute TTL).

mod auth;
mod cache;
mod catalog;
mod envelope;
mod error;
mod orders;
mod retry;
mod types;
mod uploads;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument, warn};
use url::Url;

use crate::config::StorefrontConfig;
use crate::notify::Notifier;
use crate::session::SessionStore;

use cache::{CacheKey, CacheValue};

pub use catalog::{LookbookPages, ProductPages};
pub use envelope::{ApiResponse, Pagination};
pub use error::{ApiError, ErrorKind};
pub use retry::{RetryPolicy, is_idempotent, is_retryable_status};
pub use types::{
    LookbookPhoto, OrderReceipt, Product, ProductImage, UploadedFile, UserProfile,
};

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the store REST API.
///
/// Cheap to clone; clones share the HTTP connection pool, the session store
/// and the catalog cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    sessions: SessionStore,
    notifier: Arc<dyn Notifier>,
    cache: Cache<CacheKey, CacheValue>,
}

/// Request body for one call.
enum Body {
    Empty,
    Json(serde_json::Value),
}

/// A failed attempt and whether another one may follow.
struct Failure {
    error: ApiError,
    retryable: bool,
    retry_after: Option<Duration>,
}

impl Failure {
    const fn fatal(error: ApiError) -> Self {
        Self {
            error,
            retryable: false,
            retry_after: None,
        }
    }
}

impl From<reqwest::Error> for Failure {
    fn from(error: reqwest::Error) -> Self {
        // Builder errors will fail the same way every time.
        let retryable = !error.is_builder();
        Self {
            error: ApiError::Network(error),
            retryable,
            retry_after: None,
        }
    }
}

impl ApiClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        config: &StorefrontConfig,
        sessions: SessionStore,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self::with_client(
            client,
            config.api_base_url.clone(),
            config.retry,
            sessions,
            notifier,
        ))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(
        client: reqwest::Client,
        base_url: Url,
        retry: RetryPolicy,
        sessions: SessionStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                retry,
                sessions,
                notifier,
                cache: cache::catalog_cache(),
            }),
        }
    }

    /// Session store used for the bearer token.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Base URL every path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached catalog response.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // -------------------------------------------------------------------------
    // Verbs
    // -------------------------------------------------------------------------

    /// `GET path?query`.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the last attempt.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::GET, path, query, Body::Empty).await
    }

    /// `POST path` with a JSON body. Never retried.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the request.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.json_body(body)?;
        self.request(Method::POST, path, &[], body).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the last attempt.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self.json_body(body)?;
        self.request(Method::PUT, path, &[], body).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the last attempt.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.request(Method::DELETE, path, &[], Body::Empty).await
    }

    /// `POST path` with a multipart body. Never retried, since the form is
    /// consumed by the first attempt.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the request.
    #[instrument(skip(self, form), fields(path = %path))]
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = self.endpoint(path).map_err(|e| self.surface(e))?;
        let request = self.authorize(self.inner.client.post(url)).multipart(form);

        let result = match request.send().await {
            Ok(response) => Self::read_response(response).await,
            Err(e) => Err(Failure::from(e)),
        };

        result.map_err(|failure| self.surface(failure.error))
    }

    // -------------------------------------------------------------------------
    // Pipeline
    // -------------------------------------------------------------------------

    #[instrument(skip(self, query, body), fields(method = %method, path = %path))]
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Body,
    ) -> Result<ApiResponse<T>, ApiError> {
        let url = self.endpoint(path).map_err(|e| self.surface(e))?;
        let attempts = self.inner.retry.attempts_for(&method);
        let mut attempt = 1;

        loop {
            let mut request = self
                .authorize(self.inner.client.request(method.clone(), url.clone()))
                .query(query);
            if let Body::Json(value) = &body {
                request = request.json(value);
            }

            let failure = match request.send().await {
                Ok(response) => match Self::read_response(response).await {
                    Ok(envelope) => return Ok(envelope),
                    Err(failure) => failure,
                },
                Err(e) => Failure::from(e),
            };

            if !failure.retryable || attempt >= attempts {
                return Err(self.surface(failure.error));
            }

            let delay = self.inner.retry.delay_for(attempt, failure.retry_after);
            warn!(
                attempt,
                max_attempts = attempts,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failure.error,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Turn a response into an envelope, or a classified failure.
    async fn read_response<T: DeserializeOwned>(
        response: Response,
    ) -> Result<ApiResponse<T>, Failure> {
        let status = response.status();
        let retry_after = retry_after(response.headers());
        let text = response.text().await?;

        if !status.is_success() {
            debug!(
                status = %status,
                body = %text.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(Failure {
                error: ApiError::Status {
                    kind: ErrorKind::from_status(status),
                    status: status.as_u16(),
                    message: error::message_from_body(&text),
                },
                retryable: is_retryable_status(status),
                retry_after,
            });
        }

        if text.trim().is_empty() || status == StatusCode::NO_CONTENT {
            return Ok(ApiResponse {
                success: true,
                data: None,
                pagination: None,
                message: None,
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            debug!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            Failure::fatal(ApiError::Parse(e.to_string()))
        })?;

        if !envelope.success {
            return Err(Failure::fatal(ApiError::Rejected(
                envelope.message.unwrap_or_default(),
            )));
        }

        Ok(envelope)
    }

    /// Report a final failure and hand it back to the caller.
    fn surface(&self, err: ApiError) -> ApiError {
        match err.kind() {
            ErrorKind::Server | ErrorKind::Network => error!(error = %err, "API request failed"),
            _ => warn!(error = %err, "API request failed"),
        }

        if err.kind() == ErrorKind::Unauthorized
            && let Err(e) = self.inner.sessions.clear()
        {
            warn!(error = %e, "Failed to clear expired session");
        }

        self.inner.notifier.notify(err.toast());
        err
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.inner.sessions.current() {
            Some(session) => request.bearer_auth(session.token().expose_secret()),
            None => request,
        }
    }

    /// Unwrap an envelope's `data`, surfacing a missing payload like any
    /// other failure.
    fn data<T>(&self, response: ApiResponse<T>) -> Result<T, ApiError> {
        response.into_data().map_err(|e| self.surface(e))
    }

    /// `collection/{id}` with `id` escaped as a single path segment.
    fn resource_path(&self, collection: &str, id: &str) -> Result<String, ApiError> {
        path_with_id(collection, id).map_err(|e| self.surface(e))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path.trim_start_matches('/'))?)
    }

    fn json_body<B: Serialize + ?Sized>(&self, body: &B) -> Result<Body, ApiError> {
        serde_json::to_value(body)
            .map(Body::Json)
            .map_err(|e| self.surface(ApiError::Parse(e.to_string())))
    }
}

/// Join `collection` and one escaped `id` segment.
///
/// Ids that would resolve to the collection itself or its parent are
/// refused before any request is made.
fn path_with_id(collection: &str, id: &str) -> Result<String, ApiError> {
    if matches!(id, "" | "." | "..") {
        return Err(ApiError::InvalidId(id.to_string()));
    }
    Ok(format!("{collection}/{}", urlencoding::encode(id)))
}

/// `Retry-After` in its delta-seconds form. HTTP dates are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
