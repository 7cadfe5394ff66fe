//! Checkout command.

use vitrine_core::CheckoutAddress;
use vitrine_storefront::checkout::{CheckoutStep, CheckoutWizard};
use vitrine_storefront::notify::Toast;
use vitrine_storefront::{AppError, AppState};

use crate::CheckoutArgs;
use crate::output;

/// Walk the wizard with the given answers and place the order.
///
/// # Errors
///
/// Fails at the first step whose answers are incomplete, or if the order
/// cannot be placed. The cart is only emptied on success.
pub async fn run(state: &AppState, args: CheckoutArgs) -> Result<(), AppError> {
    let mut wizard = CheckoutWizard::new();
    wizard.set_address(CheckoutAddress {
        cep: args.cep,
        street: args.street,
        number: args.number,
        complement: args.complement,
        neighborhood: args.neighborhood,
        city: args.city,
        state: args.state,
    });

    if args.lookup {
        let found = state.postal().lookup_str(&wizard.address().cep).await?;
        wizard.fill_address_from(&found);
    }

    // 1. Address
    step_header(wizard.step());
    output::address(wizard.address());
    wizard.advance()?;

    // 2. Shipping
    step_header(wizard.step());
    let cart = state.cart().snapshot();
    output::shipping_options(&wizard.shipping_options(cart.total()));
    if let Some(method) = args.shipping {
        wizard.select_shipping(method);
    }
    wizard.advance()?;

    // 3. Payment
    step_header(wizard.step());
    if let Some(code) = args.coupon.as_deref() {
        let coupon = wizard.apply_coupon(code)?;
        output::message(&format!("Cupom {} aplicado ({}%)", coupon.code, coupon.percent));
    }
    if let Some(method) = args.payment {
        wizard.select_payment(method);
    }
    output::summary(&wizard.summary(&cart));

    output::message("Processando pedido...");
    let confirmation = wizard.submit(state.cart(), state.gateway()).await?;

    state
        .notifier()
        .notify(Toast::success("Pedido realizado com sucesso!"));
    output::confirmation(&confirmation);
    Ok(())
}

fn step_header(step: CheckoutStep) {
    output::message(&format!("\n[{}/3] {}", step.number(), step.title()));
}
