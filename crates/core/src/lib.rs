//! `shopfront-core` — storefront domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure
//! concerns): identifiers, categories, money, the cart aggregate with its
//! identity and quantity invariants, and the checkout summary rules.

pub mod cart;
pub mod category;
pub mod error;
pub mod ids;
pub mod money;
pub mod session;
pub mod totals;

pub use cart::{Cart, CartLineItem, LineKey, Variant};
pub use category::Category;
pub use error::{DomainError, DomainResult};
pub use ids::{CustomerId, OrderId, ProductId};
pub use money::Price;
pub use session::{Session, UserProfile};
pub use totals::CheckoutTotals;
