//! Application state shared by every front end.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::checkout::Gateway;
use crate::config::StorefrontConfig;
use crate::error::Result;
use crate::notify::Notifier;
use crate::postal::PostalClient;
use crate::session::SessionStore;

/// Everything a front end needs, built once from configuration and passed
/// by reference.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    postal: PostalClient,
    cart: CartStore,
    sessions: SessionStore,
    gateway: Gateway,
    notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// Build the state, loading the cart and session from the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let sessions = SessionStore::load(config.session_path());
        let cart = CartStore::open(config.cart_path());
        let api = ApiClient::new(&config, sessions.clone(), Arc::clone(&notifier))?;
        let postal = PostalClient::new(&config)?;
        let gateway = Gateway::from_config(&config, &api);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                postal,
                cart,
                sessions,
                gateway,
                notifier,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Upstream REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// CEP lookup client.
    #[must_use]
    pub fn postal(&self) -> &PostalClient {
        &self.inner.postal
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// Order gateway selected by `VITRINE_ORDER_MODE`.
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.inner.gateway
    }

    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }
}
