//! Notification messages published on the storefront buses.
//!
//! Messages identify *what changed*, never the new value; consumers re-read
//! the canonical state from its owner after receiving one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use shopfront_core::{CustomerId, LineKey};

/// Which mutation committed against the canonical cart.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CartMutation {
    ItemAdded { line: LineKey },
    QuantityChanged { line: LineKey },
    ItemRemoved { line: LineKey },
    Cleared,
    Reloaded,
}

/// Published after a cart mutation commits.
#[derive(Debug, Clone, Serialize)]
pub struct CartChanged {
    event_id: Uuid,
    owner: CustomerId,
    mutation: CartMutation,
    occurred_at: DateTime<Utc>,
}

impl CartChanged {
    pub fn new(owner: CustomerId, mutation: CartMutation) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            owner,
            mutation,
            occurred_at: Utc::now(),
        }
    }

    /// Correlation id (UUIDv7, so ids sort by emission time).
    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn owner(&self) -> CustomerId {
        self.owner
    }

    pub fn mutation(&self) -> CartMutation {
        self.mutation
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// The stored session identity changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    SignedIn { customer: CustomerId },
    SignedOut,
}

/// Published after a sign-in or sign-out is persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SessionChanged {
    event_id: Uuid,
    event: SessionEvent,
    occurred_at: DateTime<Utc>,
}

impl SessionChanged {
    pub fn signed_in(customer: CustomerId) -> Self {
        Self::new(SessionEvent::SignedIn { customer })
    }

    pub fn signed_out() -> Self {
        Self::new(SessionEvent::SignedOut)
    }

    fn new(event: SessionEvent) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            event,
            occurred_at: Utc::now(),
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn event(&self) -> SessionEvent {
        self.event
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
