//! `shopfront-store` — durable client-side state.
//!
//! JSON snapshots under well-known keys (cart, auth token, user profile)
//! plus the session lifecycle that owns two of them.

pub mod local;
pub mod session;

pub use local::{LocalStore, StoreError};
pub use session::SessionManager;
