//! Cache types for catalog responses.

use std::time::Duration;

use moka::future::Cache;

use vitrine_core::ProductId;

use super::types::{LookbookPhoto, Product};
use crate::pagination::Page;

/// Cache key for products and lookbook pages.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub(crate) enum CacheKey {
    Product(ProductId),
    Products {
        page: u32,
        limit: u32,
        category: Option<String>,
    },
    Lookbook {
        page: u32,
        limit: u32,
    },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub(crate) enum CacheValue {
    Product(Box<Product>),
    Products(Page<Product>),
    Lookbook(Page<LookbookPhoto>),
}

/// Catalog cache: 1000 entries, 5-minute TTL.
pub(crate) fn catalog_cache() -> Cache<CacheKey, CacheValue> {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300))
        .build()
}
