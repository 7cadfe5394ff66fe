//! Unified error type for the storefront library.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartStorageError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::pagination::{Cancelled, PageError};
use crate::postal::PostalError;
use crate::session::SessionError;

/// Any error the storefront can surface to a front end.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Checkout: {0}")]
    Checkout(#[from] CheckoutError),

    #[error("Cart storage error: {0}")]
    CartStorage(#[from] CartStorageError),

    #[error("Postal lookup: {0}")]
    Postal(#[from] PostalError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("request cancelled")]
    Cancelled(#[from] Cancelled),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    /// Whether the failure is the shopper's to fix rather than a fault worth
    /// reporting.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Checkout(
                CheckoutError::IncompleteAddress { .. }
                    | CheckoutError::ShippingNotSelected
                    | CheckoutError::PaymentNotSelected
                    | CheckoutError::EmptyCart
                    | CheckoutError::InvalidCoupon
                    | CheckoutError::NotAtPaymentStep
                    | CheckoutError::AlreadyPlaced
            ) | Self::Postal(PostalError::InvalidCep(_) | PostalError::NotFound)
                | Self::InvalidInput(_)
                | Self::Cancelled(_)
        )
    }
}

impl From<PageError<ApiError>> for AppError {
    fn from(err: PageError<ApiError>) -> Self {
        match err {
            PageError::Cancelled => Self::Cancelled(Cancelled),
            PageError::Source(e) => Self::Api(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
