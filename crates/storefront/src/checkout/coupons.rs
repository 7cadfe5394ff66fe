//! Discount coupons.

use serde::Serialize;

use vitrine_core::Price;

/// Known codes and their percentage off the subtotal.
const COUPONS: &[(&str, u32)] = &[("WELCOME10", 10), ("VERAO15", 15), ("VIP20", 20)];

/// A coupon accepted at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedCoupon {
    /// Canonical (upper-case) code.
    pub code: String,
    pub percent: u32,
}

impl AppliedCoupon {
    /// Look up a code as typed. Surrounding whitespace and case are ignored.
    #[must_use]
    pub fn lookup(input: &str) -> Option<Self> {
        let wanted = input.trim();
        COUPONS
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(wanted))
            .map(|&(code, percent)| Self {
                code: code.to_string(),
                percent,
            })
    }

    /// Amount taken off `subtotal`, rounded to centavos.
    #[must_use]
    pub fn discount(&self, subtotal: Price) -> Price {
        subtotal.percent(self.percent)
    }
}
