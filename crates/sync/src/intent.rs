//! Cart intents: requests to mutate the canonical cart.
//!
//! An intent carries what the caller wants; the synchronizer decides
//! whether it commits. Callers never mutate a [`shopfront_core::Cart`]
//! they obtained from the synchronizer, they hand one of these back in.

use shopfront_core::{CartLineItem, LineKey};

/// Add a line to the cart, merging quantities when the line already exists.
///
/// Carries a full display draft. In local mode the draft's name, price and
/// variant are denormalized into the stored cart; in remote mode only the
/// key and quantity travel on the wire and the service resolves its own
/// product record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItem {
    pub item: CartLineItem,
}

impl AddItem {
    pub fn new(item: CartLineItem) -> Self {
        Self { item }
    }

    /// Identity of the line this intent targets.
    pub fn key(&self) -> LineKey {
        self.item.key()
    }
}

/// Replace a line's quantity. A quantity of zero or below is a removal,
/// never a stored zero-quantity line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateQuantity {
    pub key: LineKey,
    pub quantity: i64,
}

impl UpdateQuantity {
    pub fn new(key: LineKey, quantity: i64) -> Self {
        Self { key, quantity }
    }
}

/// Drop a line from the cart. Removing a line that is already gone
/// succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveItem {
    pub key: LineKey,
}

impl RemoveItem {
    pub fn new(key: LineKey) -> Self {
        Self { key }
    }
}
