//! Order submission.

use tracing::{info, instrument};

use super::types::OrderReceipt;
use super::{ApiClient, ApiError};
use crate::checkout::OrderDraft;

impl ApiClient {
    /// Submit an order to `POST /orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order or the request fails.
    #[instrument(skip(self, draft), fields(lines = draft.items.len(), total = %draft.total))]
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<OrderReceipt, ApiError> {
        let response = self.post("orders", draft).await?;
        let receipt: OrderReceipt = self.data(response)?;
        info!(order_id = %receipt.id, "Order created");
        Ok(receipt)
    }
}
