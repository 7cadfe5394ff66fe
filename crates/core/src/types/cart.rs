//! Cart line items.
//!
//! A line item is uniquely keyed by product id + size and carries a quantity.
//! The serialized form uses camelCase (`imageUrl`) so it matches the records
//! the storefront has always written.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId, Size};

/// A product being added to the cart, before it has a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLineItem {
    /// Product identifier.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Product thumbnail URL.
    pub image_url: String,
    /// Selected size.
    pub size: Size,
}

impl NewLineItem {
    /// Turn this product into a cart line with the given quantity.
    #[must_use]
    pub fn with_quantity(self, quantity: u32) -> CartLineItem {
        CartLineItem {
            id: self.id,
            name: self.name,
            price: self.price,
            image_url: self.image_url,
            size: self.size,
            quantity,
        }
    }
}

/// One cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Product identifier.
    pub id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Product thumbnail URL.
    pub image_url: String,
    /// Selected size.
    pub size: Size,
    /// Number of units, always at least 1.
    pub quantity: u32,
}

impl CartLineItem {
    /// Whether this line is the `(id, size)` pair.
    #[must_use]
    pub fn is(&self, id: &ProductId, size: Size) -> bool {
        self.size == size && &self.id == id
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}
