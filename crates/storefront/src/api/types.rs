//! Payload types exchanged with the upstream API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vitrine_core::{
    LookbookPhotoId, NewLineItem, OrderId, OrderStatus, Price, ProductId, Role, Size,
};

// =============================================================================
// Catalog
// =============================================================================

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// A product as listed by `/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    /// Sizes in stock; empty means one-size.
    #[serde(default)]
    pub sizes: Vec<Size>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: Option<u32>,
}

impl Product {
    /// URL of the first image, or empty.
    #[must_use]
    pub fn primary_image_url(&self) -> &str {
        self.images.first().map_or("", |image| image.url.as_str())
    }

    /// Whether the product can be bought in `size`.
    #[must_use]
    pub fn offers_size(&self, size: Size) -> bool {
        if self.sizes.is_empty() {
            size == Size::U
        } else {
            self.sizes.contains(&size)
        }
    }

    /// Cart entry for this product in `size`.
    #[must_use]
    pub fn line_item(&self, size: Size) -> NewLineItem {
        NewLineItem {
            id: self.id.clone(),
            name: self.name.clone(),
            price: self.price,
            image_url: self.primary_image_url().to_string(),
            size,
        }
    }
}

/// A lookbook gallery photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookbookPhoto {
    #[serde(alias = "_id")]
    pub id: LookbookPhotoId,
    #[serde(alias = "url")]
    pub image_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Auth
// =============================================================================

/// `POST /auth/login` body.
#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/register` body.
#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Account details returned on login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// `data` of a successful login or registration.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AuthPayload {
    pub token: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

// =============================================================================
// Orders and uploads
// =============================================================================

/// `data` of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    #[serde(alias = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub status: OrderStatus,
    pub total: Price,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// `data` of `POST /uploads`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub url: String,
}
