//! Test harness for Vitrine integration tests.
//!
//! Each test describes the upstream it needs as an `axum` router. The harness
//! serves it on an ephemeral port and builds an [`AppState`] pointed at it,
//! with fast retries and a throwaway data directory.
//!
//! ```rust,ignore
//! let router = Router::new().route("/products/{id}", get(product_handler));
//! let ctx = TestContext::new(router).await;
//! let product = ctx.state.api().get_product(&"A1".into()).await?;
//! ```
//!
//! The API and the CEP lookup share one base URL, so a router can serve
//! `/products` and `/ws/{cep}/json/` side by side.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

use vitrine_storefront::AppState;
use vitrine_storefront::api::RetryPolicy;
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::notify::{MemoryNotifier, Notifier};

/// A router served on `127.0.0.1` for the lifetime of the value.
pub struct FakeUpstream {
    pub addr: SocketAddr,
    pub base_url: Url,
    handle: JoinHandle<()>,
}

impl FakeUpstream {
    /// Serve `router` on an ephemeral port.
    pub async fn serve(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake upstream");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Fake upstream crashed");
        });
        let base_url = Url::parse(&format!("http://{addr}/")).expect("Invalid base URL");

        Self {
            addr,
            base_url,
            handle,
        }
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Retry policy with millisecond delays so failure tests stay fast.
#[must_use]
pub const fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
        factor: 2,
        max_delay: Duration::from_millis(50),
    }
}

/// Application state wired to a fake upstream.
pub struct TestContext {
    pub state: AppState,
    pub notifier: Arc<MemoryNotifier>,
    pub upstream: FakeUpstream,
    pub data_dir: TempDir,
}

impl TestContext {
    /// Serve `router` and build state with test defaults.
    pub async fn new(router: Router) -> Self {
        Self::with_config(router, |_| {}).await
    }

    /// Like [`new`](Self::new), letting the test adjust the configuration.
    pub async fn with_config(router: Router, adjust: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let upstream = FakeUpstream::serve(router).await;
        let data_dir = tempfile::tempdir().expect("Failed to create data dir");

        let mut config = StorefrontConfig::for_api(upstream.base_url.clone(), data_dir.path());
        config.retry = fast_retry();
        config.http_timeout = Duration::from_secs(5);
        config.simulated_order_delay = Duration::from_millis(10);
        adjust(&mut config);

        let notifier = Arc::new(MemoryNotifier::new());
        let shared: Arc<dyn Notifier> = notifier.clone();
        let state = AppState::new(config, shared).expect("Failed to build app state");

        Self {
            state,
            notifier,
            upstream,
            data_dir,
        }
    }

    /// Messages of every toast shown so far, oldest first.
    #[must_use]
    pub fn toast_messages(&self) -> Vec<String> {
        self.notifier
            .toasts()
            .into_iter()
            .map(|toast| toast.message)
            .collect()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// A product as the upstream API returns it.
#[must_use]
pub fn product_json(id: &str, name: &str, price: f64, sizes: &[&str]) -> Value {
    json!({
        "_id": id,
        "name": name,
        "price": price,
        "images": [{ "url": format!("https://cdn.example.com/{id}.jpg") }],
        "sizes": sizes,
        "category": "vestidos",
        "stock": 10,
    })
}

/// `{ success: true, data }`.
#[must_use]
pub fn ok(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

/// A list envelope for page `page` of `total` items split into pages of
/// `page_size`.
#[must_use]
pub fn page_envelope(items: Vec<Value>, page: u32, page_size: u32, total: u64) -> Value {
    let total_pages = u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX);
    json!({
        "success": true,
        "data": items,
        "pagination": {
            "currentPage": page,
            "totalPages": total_pages,
            "total": total,
            "pageSize": page_size,
        },
    })
}

/// A ViaCEP answer for Avenida Paulista.
#[must_use]
pub fn paulista_cep_json() -> Value {
    json!({
        "cep": "01310-100",
        "logradouro": "Avenida Paulista",
        "complemento": "de 1047 a 1865 - lado ímpar",
        "bairro": "Bela Vista",
        "localidade": "São Paulo",
        "uf": "SP",
        "ibge": "3550308",
        "ddd": "11",
    })
}
