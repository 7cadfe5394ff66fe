//! Core types for Vitrine.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod checkout;
pub mod id;
pub mod price;
pub mod size;
pub mod status;

pub use address::{Cep, CepError, CheckoutAddress, leading_digit};
pub use cart::{CartLineItem, NewLineItem};
pub use checkout::{PaymentMethod, ShippingMethod};
pub use id::*;
pub use price::Price;
pub use size::{Size, SizeError};
pub use status::*;
