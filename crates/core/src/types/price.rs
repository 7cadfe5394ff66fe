//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are always Brazilian reais (BRL), stored in the currency's standard
//! unit (reais, not centavos). Arithmetic never goes through floating point.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price in reais.
///
/// Serialized transparently as the underlying decimal, so a JSON line item
/// reads `"price": "50.00"` (and numbers like `50` are accepted on input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero reais.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from an amount in centavos.
    ///
    /// ```
    /// use vitrine_core::Price;
    ///
    /// assert_eq!(Price::from_cents(5_000).to_string(), "R$ 50,00");
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_cents(cents: i64) -> Self {
        // `Decimal::new` is not const; build the 96-bit mantissa by hand.
        let magnitude = cents.unsigned_abs();
        Self(Decimal::from_parts(
            magnitude as u32,
            (magnitude >> 32) as u32,
            0,
            cents < 0,
            2,
        ))
    }

    /// The decimal amount in reais.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Price multiplied by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// `pct` percent of this price, rounded half-up to centavos.
    #[must_use]
    pub fn percent(self, pct: u32) -> Self {
        let raw = self.0 * Decimal::from(pct) / Decimal::ONE_HUNDRED;
        Self(raw.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Subtract, clamping at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - other.0)
        }
    }

    /// Amount rounded to centavos, for display and wire payloads.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self(self.0.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Formats as Brazilian currency, e.g. `R$ 1.234,56`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.rounded().0;
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let text = format!("{:.2}", rounded.abs());
        let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

        let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        write!(f, "{sign}R$ {grouped},{cents}")
    }
}
