//! Three-step checkout: address, shipping, payment.
//!
//! The wizard only moves forward when the current step is filled in. The last
//! step submits the order through an [`OrderGateway`] and takes the ordered
//! lines out of the cart.

mod coupons;
mod gateway;
mod order;
mod shipping;

use thiserror::Error;
use tracing::{info, instrument};

use vitrine_core::{CheckoutAddress, PaymentMethod, Price, ShippingMethod};

use crate::api::ApiError;
use crate::cart::{CartState, CartStore};
use crate::postal::PostalAddress;

pub use coupons::AppliedCoupon;
pub use gateway::{ApiGateway, Gateway, OrderGateway, SimulatedGateway};
pub use order::{OrderConfirmation, OrderDraft, OrderSummary};
pub use shipping::{
    FREE_SHIPPING_THRESHOLD, SEDEX_SURCHARGE, ShippingQuote, quote_all, shipping_cost, tier_cost,
};

/// Reasons the wizard refuses to move on. The messages are shown as-is.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Preencha todos os campos obrigatórios do endereço")]
    IncompleteAddress { missing: Vec<&'static str> },

    #[error("Selecione um método de envio")]
    ShippingNotSelected,

    #[error("Selecione um método de pagamento")]
    PaymentNotSelected,

    #[error("Seu carrinho está vazio")]
    EmptyCart,

    #[error("Cupom inválido")]
    InvalidCoupon,

    #[error("Conclua as etapas anteriores antes de finalizar o pedido")]
    NotAtPaymentStep,

    #[error("Pedido já finalizado")]
    AlreadyPlaced,

    #[error(transparent)]
    Gateway(#[from] ApiError),
}

/// Wizard step, numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckoutStep {
    Address = 1,
    Shipping = 2,
    Payment = 3,
}

impl CheckoutStep {
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Address => "Endereço",
            Self::Shipping => "Envio",
            Self::Payment => "Pagamento",
        }
    }

    const fn next(self) -> Self {
        match self {
            Self::Address => Self::Shipping,
            Self::Shipping | Self::Payment => Self::Payment,
        }
    }

    const fn previous(self) -> Self {
        match self {
            Self::Address | Self::Shipping => Self::Address,
            Self::Payment => Self::Shipping,
        }
    }
}

/// Checkout state for one purchase.
#[derive(Debug, Clone)]
pub struct CheckoutWizard {
    step: CheckoutStep,
    address: CheckoutAddress,
    shipping: Option<ShippingMethod>,
    payment: Option<PaymentMethod>,
    coupon: Option<AppliedCoupon>,
    confirmation: Option<OrderConfirmation>,
}

impl Default for CheckoutWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutWizard {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            step: CheckoutStep::Address,
            address: CheckoutAddress {
                cep: String::new(),
                street: String::new(),
                number: String::new(),
                complement: None,
                neighborhood: String::new(),
                city: String::new(),
                state: String::new(),
            },
            shipping: None,
            payment: None,
            coupon: None,
            confirmation: None,
        }
    }

    #[must_use]
    pub const fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub const fn address(&self) -> &CheckoutAddress {
        &self.address
    }

    pub const fn address_mut(&mut self) -> &mut CheckoutAddress {
        &mut self.address
    }

    pub fn set_address(&mut self, address: CheckoutAddress) {
        self.address = address;
    }

    /// Copy a postal lookup result into the address, keeping number and
    /// complement as typed.
    pub fn fill_address_from(&mut self, found: &PostalAddress) {
        found.apply_to(&mut self.address);
    }

    pub const fn select_shipping(&mut self, method: ShippingMethod) {
        self.shipping = Some(method);
    }

    #[must_use]
    pub const fn selected_shipping(&self) -> Option<ShippingMethod> {
        self.shipping
    }

    pub const fn select_payment(&mut self, method: PaymentMethod) {
        self.payment = Some(method);
    }

    #[must_use]
    pub const fn selected_payment(&self) -> Option<PaymentMethod> {
        self.payment
    }

    /// Apply a coupon code. An unknown code clears any previous coupon.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidCoupon` for unknown codes.
    pub fn apply_coupon(&mut self, code: &str) -> Result<&AppliedCoupon, CheckoutError> {
        self.coupon = AppliedCoupon::lookup(code);
        self.coupon.as_ref().ok_or(CheckoutError::InvalidCoupon)
    }

    pub fn remove_coupon(&mut self) {
        self.coupon = None;
    }

    #[must_use]
    pub const fn coupon(&self) -> Option<&AppliedCoupon> {
        self.coupon.as_ref()
    }

    /// Validate the current step and move to the next one.
    ///
    /// On the payment step this only checks that a method is selected; use
    /// [`submit`](Self::submit) to place the order.
    ///
    /// # Errors
    ///
    /// Returns the validation failure of the current step; the step does not
    /// change.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        self.validate_step(self.step)?;
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Go back one step. Does nothing on the first step.
    pub const fn back(&mut self) -> CheckoutStep {
        self.step = self.step.previous();
        self.step
    }

    /// Quotes for every shipping service to the current CEP.
    #[must_use]
    pub fn shipping_options(&self, subtotal: Price) -> [ShippingQuote; 2] {
        quote_all(&self.address.cep, subtotal)
    }

    /// Money breakdown for `cart` with the current choices. Shipping is zero
    /// until a method is selected.
    #[must_use]
    pub fn summary(&self, cart: &CartState) -> OrderSummary {
        let subtotal = cart.total();
        let discount = self
            .coupon
            .as_ref()
            .map_or(Price::ZERO, |coupon| coupon.discount(subtotal));
        let shipping = self
            .shipping
            .map_or(Price::ZERO, |method| shipping_cost(&self.address.cep, method, subtotal));
        OrderSummary::new(subtotal, discount, shipping)
    }

    /// Build the order for `cart`, validating every step.
    ///
    /// # Errors
    ///
    /// Returns the first failing validation.
    pub fn draft(&self, cart: &CartState) -> Result<OrderDraft, CheckoutError> {
        self.validate_step(CheckoutStep::Address)?;
        let shipping_method = self.shipping.ok_or(CheckoutError::ShippingNotSelected)?;
        let payment_method = self.payment.ok_or(CheckoutError::PaymentNotSelected)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let summary = self.summary(cart);
        Ok(OrderDraft {
            items: cart.items().to_vec(),
            address: self.address.clone(),
            shipping_method,
            payment_method,
            coupon: self.coupon.as_ref().map(|coupon| coupon.code.clone()),
            subtotal: summary.subtotal,
            discount: summary.discount,
            shipping: summary.shipping,
            total: summary.total,
        })
    }

    /// Place the order and take the ordered units out of the cart.
    ///
    /// Lines added while the gateway is working are kept.
    ///
    /// # Errors
    ///
    /// Fails if the wizard is not on the payment step, a step is incomplete,
    /// the cart is empty or the gateway rejects the order. The cart is only
    /// changed on success.
    #[instrument(skip_all)]
    pub async fn submit<G: OrderGateway>(
        &mut self,
        cart: &CartStore,
        gateway: &G,
    ) -> Result<OrderConfirmation, CheckoutError> {
        if self.confirmation.is_some() {
            return Err(CheckoutError::AlreadyPlaced);
        }
        if self.step != CheckoutStep::Payment {
            return Err(CheckoutError::NotAtPaymentStep);
        }
        if self.payment.is_none() {
            return Err(CheckoutError::PaymentNotSelected);
        }

        let draft = self.draft(&cart.snapshot())?;
        let confirmation = gateway.place_order(&draft).await?;

        cart.remove_ordered(&draft.items);
        info!(
            order_id = %confirmation.order_id,
            total = %confirmation.total,
            "Order placed"
        );

        self.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }

    /// The confirmation of a placed order.
    #[must_use]
    pub const fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    fn validate_step(&self, step: CheckoutStep) -> Result<(), CheckoutError> {
        match step {
            CheckoutStep::Address => {
                let missing = self.address.missing_required();
                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(CheckoutError::IncompleteAddress { missing })
                }
            }
            CheckoutStep::Shipping => self
                .shipping
                .map(|_| ())
                .ok_or(CheckoutError::ShippingNotSelected),
            CheckoutStep::Payment => self
                .payment
                .map(|_| ())
                .ok_or(CheckoutError::PaymentNotSelected),
        }
    }
}
