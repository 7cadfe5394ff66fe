//! Catalog commands: products and lookbook.

use tokio::task::JoinHandle;

use vitrine_core::ProductId;
use vitrine_storefront::api::{LookbookPages, ProductPages};
use vitrine_storefront::pagination::{CancelToken, LoadOutcome, PageError, PageSource, Paginator};
use vitrine_storefront::{AppError, AppState};

use crate::output;

/// Print one page of products, or every page with `all`.
///
/// # Errors
///
/// Fails if a page cannot be fetched.
pub async fn list_products(
    state: &AppState,
    page: u32,
    limit: u32,
    category: Option<String>,
    all: bool,
) -> Result<(), AppError> {
    if all {
        let source = ProductPages::new(state.api().clone(), category);
        let total = load_all(source, limit, output::product_row).await?;
        output::message(&format!("{total} produtos"));
        return Ok(());
    }

    let products = state
        .api()
        .list_products(page, limit, category.as_deref())
        .await?;
    output::products(&products);
    Ok(())
}

/// Print one product.
///
/// # Errors
///
/// Fails if the product does not exist or cannot be fetched.
pub async fn show_product(state: &AppState, id: &ProductId) -> Result<(), AppError> {
    let product = state.api().get_product(id).await?;
    output::product(&product);
    Ok(())
}

/// Print one page of lookbook photos, or every page with `all`.
///
/// # Errors
///
/// Fails if a page cannot be fetched.
pub async fn list_lookbook(
    state: &AppState,
    page: u32,
    limit: u32,
    all: bool,
) -> Result<(), AppError> {
    if all {
        let source = LookbookPages::new(state.api().clone());
        let total = load_all(source, limit, output::lookbook_row).await?;
        output::message(&format!("{total} fotos"));
        return Ok(());
    }

    let photos = state.api().list_lookbook(page, limit).await?;
    output::lookbook(&photos);
    Ok(())
}

/// Cancel `token` on Ctrl+C.
fn cancel_on_ctrl_c(token: &CancelToken) -> JoinHandle<()> {
    let token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    })
}

/// Load pages until the source runs dry or Ctrl+C, printing each item as it
/// arrives. Returns the number of items loaded.
async fn load_all<S>(source: S, page_size: u32, print: fn(&S::Item)) -> Result<usize, AppError>
where
    S: PageSource,
    AppError: From<PageError<S::Error>>,
{
    let cancel = CancelToken::new();
    let watcher = cancel_on_ctrl_c(&cancel);
    let mut paginator = Paginator::new(source, page_size);

    let result = loop {
        let before = paginator.items().len();
        match paginator.load_more(&cancel).await {
            Ok(LoadOutcome::Loaded(_)) => paginator.items().iter().skip(before).for_each(print),
            Ok(LoadOutcome::Exhausted) => break Ok(paginator.items().len()),
            Err(PageError::Cancelled) => {
                output::message("Interrompido");
                break Ok(paginator.items().len());
            }
            Err(e) => break Err(AppError::from(e)),
        }
    };

    watcher.abort();
    result
}
