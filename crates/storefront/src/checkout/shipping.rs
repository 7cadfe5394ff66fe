//! Shipping quotes.
//!
//! Cost depends only on the region (first CEP digit) and the service. Orders
//! above [`FREE_SHIPPING_THRESHOLD`] ship free with either service.

use serde::Serialize;

use vitrine_core::{Price, ShippingMethod, leading_digit};

/// Subtotals strictly above this ship free.
pub const FREE_SHIPPING_THRESHOLD: Price = Price::from_cents(29_900);

/// Surcharge for the express service over the regional base cost.
pub const SEDEX_SURCHARGE: Price = Price::from_cents(1_500);

/// Regional base cost for the CEP's first digit.
///
/// A CEP without any digit pays the top tier.
#[must_use]
pub const fn tier_cost(first_digit: Option<u8>) -> Price {
    match first_digit {
        Some(0..=3) => Price::from_cents(1_500),
        Some(4..=6) => Price::from_cents(2_500),
        _ => Price::from_cents(3_500),
    }
}

/// Shipping cost for `method` to `cep` on an order of `subtotal`.
#[must_use]
pub fn shipping_cost(cep: &str, method: ShippingMethod, subtotal: Price) -> Price {
    if subtotal > FREE_SHIPPING_THRESHOLD {
        return Price::ZERO;
    }

    let base = tier_cost(leading_digit(cep));
    match method {
        ShippingMethod::Pac => base,
        ShippingMethod::Sedex => base + SEDEX_SURCHARGE,
    }
}

/// One shipping option as shown at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingQuote {
    pub method: ShippingMethod,
    pub cost: Price,
    /// Business days, `(min, max)`.
    pub delivery_days: (u8, u8),
}

impl ShippingQuote {
    #[must_use]
    pub const fn is_free(&self) -> bool {
        self.cost.is_zero()
    }
}

/// Quotes for every shipping service, cheapest first.
#[must_use]
pub fn quote_all(cep: &str, subtotal: Price) -> [ShippingQuote; 2] {
    [ShippingMethod::Pac, ShippingMethod::Sedex].map(|method| ShippingQuote {
        method,
        cost: shipping_cost(cep, method, subtotal),
        delivery_days: method.delivery_days(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_ORDER: Price = Price::from_cents(10_000);

    #[test]
    fn test_regional_tiers() {
        assert_eq!(shipping_cost("01310-100", ShippingMethod::Pac, SMALL_ORDER), Price::from_cents(1_500));
        assert_eq!(shipping_cost("39400-000", ShippingMethod::Pac, SMALL_ORDER), Price::from_cents(1_500));
        assert_eq!(shipping_cost("80010-000", ShippingMethod::Pac, SMALL_ORDER), Price::from_cents(3_500));
        assert_eq!(shipping_cost("40010-000", ShippingMethod::Pac, SMALL_ORDER), Price::from_cents(2_500));
        assert_eq!(shipping_cost("69900-000", ShippingMethod::Pac, SMALL_ORDER), Price::from_cents(2_500));
    }

    #[test]
    fn test_sedex_adds_surcharge() {
        assert_eq!(shipping_cost("01310100", ShippingMethod::Sedex, SMALL_ORDER), Price::from_cents(3_000));
        assert_eq!(shipping_cost("90000000", ShippingMethod::Sedex, SMALL_ORDER), Price::from_cents(5_000));
    }

    #[test]
    fn test_free_shipping_above_threshold() {
        let just_above = Price::from_cents(29_901);
        assert_eq!(shipping_cost("90000000", ShippingMethod::Sedex, just_above), Price::ZERO);
        assert_eq!(shipping_cost("90000000", ShippingMethod::Pac, just_above), Price::ZERO);

        // The threshold itself still pays.
        assert_eq!(
            shipping_cost("01310100", ShippingMethod::Pac, FREE_SHIPPING_THRESHOLD),
            Price::from_cents(1_500)
        );
    }

    #[test]
    fn test_cep_without_digits_pays_top_tier() {
        assert_eq!(shipping_cost("", ShippingMethod::Pac, SMALL_ORDER), Price::from_cents(3_500));
        assert_eq!(shipping_cost("abc", ShippingMethod::Pac, SMALL_ORDER), Price::from_cents(3_500));
    }

    #[test]
    fn test_quote_all() {
        let quotes = quote_all("01310-100", SMALL_ORDER);
        assert_eq!(quotes[0].method, ShippingMethod::Pac);
        assert_eq!(quotes[0].cost, Price::from_cents(1_500));
        assert_eq!(quotes[1].method, ShippingMethod::Sedex);
        assert_eq!(quotes[1].delivery_days, (1, 3));
        assert!(quote_all("01310-100", Price::from_cents(50_000)).iter().all(ShippingQuote::is_free));
    }
}
