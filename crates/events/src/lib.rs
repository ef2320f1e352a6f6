//! `shopfront-events` — in-process change notifications.
//!
//! A small pub/sub layer that lets the cart and session owners announce
//! "this changed, re-read it" to whoever is rendering. Messages carry
//! metadata only; consumers pull the fresh state from the owning component.

pub mod bus;
pub mod in_memory_bus;
pub mod message;

pub use bus::{EventBus, Handler, Subscription};
pub use in_memory_bus::InMemoryEventBus;
pub use message::{CartChanged, CartMutation, SessionChanged, SessionEvent};
