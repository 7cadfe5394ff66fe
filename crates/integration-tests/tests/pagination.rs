//! Integration tests for paginated catalog loading and request cancellation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::Query;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use vitrine_integration_tests::{TestContext, page_envelope, product_json};
use vitrine_storefront::api::{LookbookPages, ProductPages};
use vitrine_storefront::pagination::{CancelToken, LoadOutcome, PageError, Paginator, RequestSlot};

const CATALOG_SIZE: u32 = 5;

/// Serves a catalog of `CATALOG_SIZE` products, honouring `page` and `limit`.
async fn catalog(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let page: u32 = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let limit: u32 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(12);
    let category = params.get("category").cloned();

    let start = (page - 1) * limit + 1;
    let end = (start + limit).min(CATALOG_SIZE + 1);
    let items = (start..end)
        .map(|n| {
            let mut product = product_json(&format!("P{n}"), &format!("Produto {n}"), 99.9, &["M"]);
            if let Some(category) = &category {
                product["category"] = Value::String(category.clone());
            }
            product
        })
        .collect();

    Json(page_envelope(items, page, limit, u64::from(CATALOG_SIZE)))
}

#[tokio::test]
async fn test_paginator_loads_whole_catalog() {
    let ctx = TestContext::new(Router::new().route("/products", get(catalog))).await;
    let mut paginator = Paginator::new(ProductPages::new(ctx.state.api().clone(), None), 2);
    let cancel = CancelToken::new();

    assert_eq!(paginator.load_more(&cancel).await.expect("page 1"), LoadOutcome::Loaded(2));
    assert_eq!(paginator.total_pages(), Some(3));
    assert_eq!(paginator.total(), Some(5));

    assert_eq!(paginator.load_more(&cancel).await.expect("page 2"), LoadOutcome::Loaded(2));
    assert_eq!(paginator.load_more(&cancel).await.expect("page 3"), LoadOutcome::Loaded(1));
    assert!(!paginator.has_more());
    assert_eq!(paginator.load_more(&cancel).await.expect("done"), LoadOutcome::Exhausted);

    let ids: Vec<String> = paginator
        .items()
        .iter()
        .map(|product| product.id.to_string())
        .collect();
    assert_eq!(ids, ["P1", "P2", "P3", "P4", "P5"]);
}

#[tokio::test]
async fn test_category_filter_is_forwarded() {
    let ctx = TestContext::new(Router::new().route("/products", get(catalog))).await;
    let mut paginator = Paginator::new(
        ProductPages::new(ctx.state.api().clone(), Some("saias".to_string())),
        10,
    );

    paginator.load_more(&CancelToken::new()).await.expect("page 1");

    assert!(
        paginator
            .items()
            .iter()
            .all(|product| product.category.as_deref() == Some("saias"))
    );
}

#[tokio::test]
async fn test_reset_starts_over() {
    let ctx = TestContext::new(Router::new().route("/products", get(catalog))).await;
    let mut paginator = Paginator::new(ProductPages::new(ctx.state.api().clone(), None), 2);
    let cancel = CancelToken::new();

    paginator.load_more(&cancel).await.expect("page 1");
    paginator.load_more(&cancel).await.expect("page 2");
    paginator.reset();

    assert!(paginator.items().is_empty());
    assert_eq!(paginator.next_page(), 1);
    paginator.load_more(&cancel).await.expect("page 1 again");
    assert_eq!(paginator.items().len(), 2);
}

#[tokio::test]
async fn test_cancelled_load_leaves_paginator_untouched() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new().route(
        "/lookbook",
        get({
            let hits = Arc::clone(&hits);
            move || {
                let hits = Arc::clone(&hits);
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Json(page_envelope(Vec::new(), 1, 10, 0))
                }
            }
        }),
    );
    let ctx = TestContext::new(router).await;
    let mut paginator = Paginator::new(LookbookPages::new(ctx.state.api().clone()), 10);

    let slot = RequestSlot::new();
    let first = slot.begin();
    let canceller = {
        let first = first.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            first.cancel();
        })
    };

    let started = std::time::Instant::now();
    let result = paginator.load_more(&first).await;
    canceller.await.expect("canceller task");

    assert!(matches!(result, Err(PageError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert!(paginator.items().is_empty());
    assert_eq!(paginator.next_page(), 1);
    // Cancellation is silent.
    assert!(ctx.toast_messages().is_empty());
}

#[test]
fn test_request_slot_supersedes_previous_request() {
    let slot = RequestSlot::new();

    let older = slot.begin();
    let newer = slot.begin();
    assert!(older.is_cancelled());
    assert!(!newer.is_cancelled());

    slot.cancel();
    assert!(newer.is_cancelled());
}
