//! Order totals, drafts and confirmations.

use chrono::{DateTime, Utc};
use serde::Serialize;

use vitrine_core::{
    CartLineItem, CheckoutAddress, OrderId, OrderStatus, PaymentMethod, Price, ShippingMethod,
};

/// Money breakdown shown on the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub subtotal: Price,
    pub discount: Price,
    pub shipping: Price,
    pub total: Price,
}

impl OrderSummary {
    /// `subtotal - discount + shipping`, never below zero.
    #[must_use]
    pub fn new(subtotal: Price, discount: Price, shipping: Price) -> Self {
        Self {
            subtotal,
            discount,
            shipping,
            total: subtotal.saturating_sub(discount) + shipping,
        }
    }
}

/// Everything needed to place an order. Sent as the `POST /orders` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub items: Vec<CartLineItem>,
    pub address: CheckoutAddress,
    pub shipping_method: ShippingMethod,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    pub subtotal: Price,
    pub discount: Price,
    pub shipping: Price,
    pub total: Price,
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
}
