//! Money handling for prices and totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A non-negative amount in the storefront's single display currency.
///
/// The services exchange prices as plain JSON numbers (`19.99`), so this
/// wraps [`Decimal`] with float serde rather than integer minor units.
/// Decimal arithmetic keeps line totals exact (`19.99 × 3 = 59.97`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Build a price, rejecting negative amounts.
    pub fn new(amount: Decimal) -> Result<Self, DomainError> {
        if amount.is_sign_negative() {
            return Err(DomainError::validation(format!(
                "price must be non-negative, got {amount}"
            )));
        }
        Ok(Self(amount))
    }

    /// Clamp a raw wire amount into the non-negative domain.
    ///
    /// Remote payloads are not trusted to be well-formed; callers log when
    /// the clamp actually fires.
    pub fn clamped(amount: Decimal) -> Self {
        if amount.is_sign_negative() {
            Self(Decimal::ZERO)
        } else {
            Self(amount)
        }
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units.
    pub fn times(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
