//! Catalog endpoints: products and lookbook photos.

use std::future::Future;

use tracing::{debug, instrument};

use vitrine_core::ProductId;

use super::cache::{CacheKey, CacheValue};
use super::types::{LookbookPhoto, Product};
use super::{ApiClient, ApiError};
use crate::pagination::{Page, PageSource};

impl ApiClient {
    /// Get one page of products, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u32,
        limit: u32,
        category: Option<&str>,
    ) -> Result<Page<Product>, ApiError> {
        let cache_key = CacheKey::Products {
            page,
            limit,
            category: category.map(str::to_string),
        };

        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let mut query = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(category) = category {
            query.push(("category", category.to_string()));
        }

        let response = self.get::<Vec<Product>>("products", &query).await?;
        let pagination = response.pagination;
        let products = Page::from_parts(response.data.unwrap_or_default(), pagination, page);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id.clone());

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let path = self.resource_path("products", id.as_str())?;
        let response = self.get(&path, &[]).await?;
        let product: Product = self.data(response)?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get one page of lookbook photos.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_lookbook(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<Page<LookbookPhoto>, ApiError> {
        let cache_key = CacheKey::Lookbook { page, limit };

        if let Some(CacheValue::Lookbook(photos)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for lookbook");
            return Ok(photos);
        }

        let query = [("page", page.to_string()), ("limit", limit.to_string())];
        let response = self.get::<Vec<LookbookPhoto>>("lookbook", &query).await?;
        let pagination = response.pagination;
        let photos = Page::from_parts(response.data.unwrap_or_default(), pagination, page);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Lookbook(photos.clone()))
            .await;

        Ok(photos)
    }
}

// =============================================================================
// Page sources
// =============================================================================

/// Product listing as a [`PageSource`].
#[derive(Clone)]
pub struct ProductPages {
    client: ApiClient,
    category: Option<String>,
}

impl ProductPages {
    #[must_use]
    pub const fn new(client: ApiClient, category: Option<String>) -> Self {
        Self { client, category }
    }
}

impl PageSource for ProductPages {
    type Item = Product;
    type Error = ApiError;

    fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Page<Product>, ApiError>> + Send {
        let client = self.client.clone();
        let category = self.category.clone();
        async move {
            client
                .list_products(page, page_size, category.as_deref())
                .await
        }
    }
}

/// Lookbook gallery as a [`PageSource`].
#[derive(Clone)]
pub struct LookbookPages {
    client: ApiClient,
}

impl LookbookPages {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl PageSource for LookbookPages {
    type Item = LookbookPhoto;
    type Error = ApiError;

    fn fetch_page(
        &self,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = Result<Page<LookbookPhoto>, ApiError>> + Send {
        let client = self.client.clone();
        async move { client.list_lookbook(page, page_size).await }
    }
}
