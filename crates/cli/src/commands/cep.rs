//! CEP lookup command.

use vitrine_core::CheckoutAddress;
use vitrine_storefront::{AppError, AppState};

use crate::output;

/// Print the address of a CEP.
///
/// # Errors
///
/// Fails for malformed or unknown CEPs, or if the lookup service is down.
pub async fn lookup(state: &AppState, cep: &str) -> Result<(), AppError> {
    let found = state.postal().lookup_str(cep).await?;

    let mut address = CheckoutAddress::default();
    found.apply_to(&mut address);
    output::address(&address);
    Ok(())
}
