//! `shopfront-sync` — cart consistency coordination.
//!
//! One component, the [`CartSynchronizer`], owns the canonical cart.
//! Intents come in, the authoritative store (local snapshot or remote cart
//! service, by mode) decides whether they commit, and exactly one change
//! notification goes out per committed intent. Nothing is published and
//! nothing visible changes for a rejected intent, so consumers always
//! render a cart that really exists.

pub mod intent;
pub mod synchronizer;

pub use intent::{AddItem, RemoveItem, UpdateQuantity};
pub use synchronizer::{CartMode, CartSynchronizer, SyncError};
