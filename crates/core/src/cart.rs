//! The cart aggregate: line items keyed by `(product id, category)`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{DomainError, DomainResult};
use crate::ids::{CustomerId, ProductId};
use crate::money::Price;

/// Identity of a cart line.
///
/// Product ids are not globally unique across the catalog services, so the
/// category is part of the key. Variant attributes (size, color) are
/// display-only and never split lines.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: ProductId,
    pub category: Category,
}

impl LineKey {
    pub fn new(product_id: ProductId, category: Category) -> Self {
        Self {
            product_id,
            category,
        }
    }
}

impl core::fmt::Display for LineKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.category, self.product_id)
    }
}

/// Display-only variant attributes captured from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Variant {
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.color.is_none()
    }
}

/// One line of a cart: a product reference plus the display data captured
/// when the item was added or last refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub category: Category,
    pub name: String,
    pub unit_price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Always ≥ 1; a zero-quantity line is removed, never stored.
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Variant::is_empty")]
    pub variant: Variant,
}

impl CartLineItem {
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id, self.category)
    }

    /// `unit_price × quantity`, recomputed on demand.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.times(self.quantity)
    }
}

/// A customer's cart: lines unique by [`LineKey`], in insertion order.
///
/// Totals and counts are always derived from the current lines; nothing
/// here caches a subtotal or item count that could drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cart {
    owner: CustomerId,
    items: Vec<CartLineItem>,
}

impl Cart {
    pub fn empty(owner: CustomerId) -> Self {
        Self {
            owner,
            items: Vec::new(),
        }
    }

    pub fn owner(&self) -> CustomerId {
        self.owner
    }

    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn line(&self, key: LineKey) -> Option<&CartLineItem> {
        self.items.iter().find(|item| item.key() == key)
    }

    /// Sum of line totals over the current lines.
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Sum of quantities over the current lines (the badge count).
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add `draft` to the cart.
    ///
    /// If a line with the same key already exists the quantities merge and
    /// the display data is refreshed from the incoming draft; otherwise the
    /// draft is appended. A zero quantity is rejected.
    pub fn add(&mut self, draft: CartLineItem) -> DomainResult<()> {
        if draft.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1"));
        }
        match self.items.iter_mut().find(|item| item.key() == draft.key()) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(draft.quantity);
                existing.name = draft.name;
                existing.unit_price = draft.unit_price;
                existing.image_ref = draft.image_ref;
                existing.variant = draft.variant;
            }
            None => self.items.push(draft),
        }
        Ok(())
    }

    /// Replace the quantity of the line for `key`.
    ///
    /// Zero removes the line (a cart never holds a zero-quantity line) and
    /// succeeds whether or not the line exists. A positive quantity on an
    /// absent line is an error.
    pub fn set_quantity(&mut self, key: LineKey, quantity: u32) -> DomainResult<()> {
        if quantity == 0 {
            self.remove(key);
            return Ok(());
        }
        match self.items.iter_mut().find(|item| item.key() == key) {
            Some(existing) => {
                existing.quantity = quantity;
                Ok(())
            }
            None => Err(DomainError::not_found(format!("cart line {key}"))),
        }
    }

    /// Remove the line for `key`; removing an absent line is a no-op.
    /// Returns whether a line was actually removed.
    pub fn remove(&mut self, key: LineKey) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.key() != key);
        self.items.len() != before
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Deserialization folds the raw lines through [`Cart::add`] so that a
/// snapshot read back from disk or the wire can never materialize duplicate
/// keys or zero-quantity lines, whatever the payload claims.
impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            owner: CustomerId,
            #[serde(default)]
            items: Vec<CartLineItem>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut cart = Cart::empty(raw.owner);
        for item in raw.items {
            if item.quantity == 0 {
                continue;
            }
            // `add` only rejects zero quantities, which were skipped above.
            let _ = cart.add(item);
        }
        Ok(cart)
    }
}
