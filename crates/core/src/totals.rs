//! Checkout summary derivation.

use rust_decimal::Decimal;

use crate::cart::Cart;

/// Flat shipping fee charged below the free-shipping threshold.
fn flat_shipping_fee() -> Decimal {
    Decimal::new(1000, 2)
}

/// Order value above which shipping is free.
fn free_shipping_threshold() -> Decimal {
    Decimal::new(100, 0)
}

/// Sales tax applied to the subtotal.
fn tax_rate() -> Decimal {
    Decimal::new(7, 2)
}

/// The money summary shown at checkout.
///
/// Derived from the cart lines on every call; a summary is never stored
/// alongside the cart where it could drift.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CheckoutTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CheckoutTotals {
    /// Compute the summary for `cart`.
    ///
    /// Shipping is a flat 10.00 below the 100.00 threshold and free above
    /// it; tax is 7% of the subtotal, rounded to cents. An empty cart owes
    /// nothing at all.
    pub fn from_cart(cart: &Cart) -> Self {
        let subtotal = cart.subtotal();
        let shipping = if cart.is_empty() || subtotal > free_shipping_threshold() {
            Decimal::ZERO
        } else {
            flat_shipping_fee()
        };
        let tax = (subtotal * tax_rate()).round_dp(2);
        let total = subtotal + shipping + tax;
        Self {
            subtotal,
            shipping,
            tax,
            total,
        }
    }
}
