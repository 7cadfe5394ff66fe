//! Checkout choices: shipping and payment methods.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Shipping service offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Economy ground service.
    Pac,
    /// Express service.
    Sedex,
}

impl ShippingMethod {
    /// Estimated delivery window in business days.
    #[must_use]
    pub const fn delivery_days(&self) -> (u8, u8) {
        match self {
            Self::Pac => (5, 10),
            Self::Sedex => (1, 3),
        }
    }

    /// Customer-facing label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pac => "PAC",
            Self::Sedex => "SEDEX",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pac => write!(f, "pac"),
            Self::Sedex => write!(f, "sedex"),
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pac" => Ok(Self::Pac),
            "sedex" => Ok(Self::Sedex),
            _ => Err(format!("invalid shipping method: {s}")),
        }
    }
}

/// Payment method chosen in the last checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Pix,
    CreditCard,
    Boleto,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pix => write!(f, "pix"),
            Self::CreditCard => write!(f, "credit_card"),
            Self::Boleto => write!(f, "boleto"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pix" => Ok(Self::Pix),
            "credit_card" | "card" => Ok(Self::CreditCard),
            "boleto" => Ok(Self::Boleto),
            _ => Err(format!("invalid payment method: {s}")),
        }
    }
}
