//! Change-notification pub/sub (mechanics only).
//!
//! The bus distributes **notifications that state changed**, never the state
//! itself: messages carry identifying metadata and consumers re-read the
//! canonical value from its owner. That keeps every consumer rendering from
//! one source of truth instead of from whatever payload happened to reach it.
//!
//! ## Delivery semantics
//!
//! - **Synchronous, same-process**: `publish` invokes each handler on the
//!   publishing thread before it returns. There is no queueing, no replay,
//!   and no cross-process delivery.
//! - **Registration order**: the subscribers registered at publish time are
//!   each invoked exactly once, in the order they subscribed.
//! - **Isolation**: a handler that panics is caught and logged; the
//!   remaining handlers still run.

use std::sync::Arc;

/// Callback invoked with every published message.
pub type Handler<M> = Box<dyn Fn(&M) + Send + Sync + 'static>;

/// Guard for an active subscription.
///
/// Dropping the guard (or calling [`Subscription::cancel`]) removes the
/// handler from the bus; publishes after that point no longer reach it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Explicitly unsubscribe; equivalent to dropping the guard.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl core::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// Pub/sub bus for change notifications.
///
/// `publish` is fire-and-forget: handler outcomes are not surfaced to the
/// publisher, so a misbehaving consumer can never fail the mutation that
/// triggered the notification.
pub trait EventBus<M: 'static>: Send + Sync {
    /// Dispatch `message` to every subscriber registered at this moment,
    /// in registration order.
    fn publish(&self, message: M);

    /// Register `handler` for future publishes.
    fn subscribe(&self, handler: Handler<M>) -> Subscription;
}

impl<M, B> EventBus<M> for Arc<B>
where
    M: 'static,
    B: EventBus<M> + ?Sized,
{
    fn publish(&self, message: M) {
        (**self).publish(message)
    }

    fn subscribe(&self, handler: Handler<M>) -> Subscription {
        (**self).subscribe(handler)
    }
}
