//! Where orders are placed.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use vitrine_core::{OrderId, OrderStatus};

use super::order::{OrderConfirmation, OrderDraft};
use crate::api::{ApiClient, ApiError};
use crate::config::{OrderMode, StorefrontConfig};

/// Places orders.
pub trait OrderGateway: Send + Sync {
    /// Place `draft` and return the confirmation.
    fn place_order(
        &self,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<OrderConfirmation, ApiError>> + Send;
}

/// Accepts every order after a fixed delay, without contacting the API.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

/// `VT-` followed by eight upper-case hex digits.
fn simulated_order_id() -> OrderId {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(8)
        .collect();
    OrderId::new(format!("VT-{}", suffix.to_ascii_uppercase()))
}

impl OrderGateway for SimulatedGateway {
    #[instrument(skip(self, draft), fields(total = %draft.total))]
    async fn place_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, ApiError> {
        tokio::time::sleep(self.delay).await;

        let confirmation = OrderConfirmation {
            order_id: simulated_order_id(),
            status: OrderStatus::Pending,
            total: draft.total,
            placed_at: Utc::now(),
        };
        info!(order_id = %confirmation.order_id, "Simulated order placed");
        Ok(confirmation)
    }
}

/// Places orders through `POST /orders`.
#[derive(Clone)]
pub struct ApiGateway {
    client: ApiClient,
}

impl ApiGateway {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl OrderGateway for ApiGateway {
    async fn place_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, ApiError> {
        let receipt = self.client.create_order(draft).await?;
        Ok(OrderConfirmation {
            order_id: receipt.id,
            status: receipt.status,
            total: receipt.total,
            placed_at: receipt.created_at.unwrap_or_else(Utc::now),
        })
    }
}

/// The gateway selected by configuration.
#[derive(Clone)]
pub enum Gateway {
    Simulated(SimulatedGateway),
    Api(ApiGateway),
}

impl Gateway {
    /// Pick the gateway for `config.order_mode`.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig, client: &ApiClient) -> Self {
        match config.order_mode {
            OrderMode::Simulated => Self::Simulated(SimulatedGateway::new(config.simulated_order_delay)),
            OrderMode::Api => Self::Api(ApiGateway::new(client.clone())),
        }
    }
}

impl OrderGateway for Gateway {
    async fn place_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, ApiError> {
        match self {
            Self::Simulated(gateway) => gateway.place_order(draft).await,
            Self::Api(gateway) => gateway.place_order(draft).await,
        }
    }
}
