//! Cart commands.

use vitrine_core::{ProductId, Size};
use vitrine_storefront::{AppError, AppState};

use crate::output;

/// Add one unit of a catalog product.
///
/// # Errors
///
/// Fails if the product cannot be fetched or is not sold in `size`.
pub async fn add(state: &AppState, id: &ProductId, size: Size) -> Result<(), AppError> {
    let product = state.api().get_product(id).await?;
    if !product.offers_size(size) {
        return Err(AppError::InvalidInput(format!(
            "{} não está disponível no tamanho {size}",
            product.name
        )));
    }

    state.cart().add_to_cart(product.line_item(size));
    tracing::info!(product_id = %id, %size, "Added to cart");
    output::cart(&state.cart().snapshot());
    Ok(())
}

pub fn remove(state: &AppState, id: &ProductId, size: Size) {
    state.cart().remove_from_cart(id, size);
    output::cart(&state.cart().snapshot());
}

pub fn update(state: &AppState, id: &ProductId, size: Size, quantity: i64) {
    state.cart().update_quantity(id, size, quantity);
    output::cart(&state.cart().snapshot());
}

pub fn list(state: &AppState) {
    output::cart(&state.cart().snapshot());
}

pub fn clear(state: &AppState) {
    state.cart().clear_cart();
    output::message("Carrinho esvaziado");
}
