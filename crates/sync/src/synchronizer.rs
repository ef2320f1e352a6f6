//! The cart synchronizer: single entry point for cart mutations.
//!
//! All cart writes flow through [`CartSynchronizer`]. It validates the
//! intent, applies it to the authoritative store for the active mode (the
//! local snapshot, or the remote cart service), and only then swaps its
//! canonical in-memory cart and announces the change. A rejected intent
//! changes nothing and announces nothing, so every consumer keeps rendering
//! the last cart that actually committed.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, RwLock};
use uuid::Uuid;

use shopfront_client::{CartGateway, CartOperationError};
use shopfront_core::{Cart, CartLineItem, CheckoutTotals, CustomerId, DomainError, LineKey};
use shopfront_events::{CartChanged, CartMutation, EventBus, Handler, InMemoryEventBus, Subscription};
use shopfront_store::{LocalStore, StoreError};

use crate::intent::{AddItem, RemoveItem, UpdateQuantity};

/// Which store is authoritative for cart writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartMode {
    /// The on-disk snapshot is the cart. No network involved.
    Local,
    /// The remote cart service is the cart; the on-disk snapshot is only a
    /// display cache refreshed after committed writes.
    Remote,
}

impl CartMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartMode::Local => "local",
            CartMode::Remote => "remote",
        }
    }
}

impl fmt::Display for CartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartMode {
    type Err = DomainError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(CartMode::Local),
            "remote" => Ok(CartMode::Remote),
            other => Err(DomainError::validation(format!(
                "unknown cart mode '{other}', expected 'local' or 'remote'"
            ))),
        }
    }
}

/// Why an intent did not commit. Whenever one of these comes back, the
/// canonical cart and its subscribers are exactly as they were before the
/// call.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The intent itself was invalid (zero-quantity add, unknown line).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The authoritative snapshot could not be persisted in local mode.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The remote cart service refused or never received the write.
    #[error(transparent)]
    Remote(#[from] CartOperationError),
}

/// Owns the canonical cart and coordinates every mutation against the
/// authoritative store.
///
/// Commit discipline, uniform across modes:
///
/// 1. validate the intent;
/// 2. apply it to the authoritative store (disk in local mode, the remote
///    service in remote mode);
/// 3. swap the canonical cart to the committed state;
/// 4. publish exactly one [`CartChanged`] for it.
///
/// Steps 3 and 4 only run when step 2 succeeded, so there is no optimistic
/// state to roll back and no notification for a write that never landed.
/// Intents against the same line are serialized; `clear` and `refresh`
/// exclude all line intents while they reconcile the whole cart.
pub struct CartSynchronizer {
    mode: CartMode,
    owner: CustomerId,
    store: LocalStore,
    gateway: Arc<dyn CartGateway>,
    bus: Arc<InMemoryEventBus<CartChanged>>,
    /// Canonical snapshot, swapped only by `commit`.
    canonical: Mutex<Cart>,
    /// Held shared by line intents, exclusively by clear/refresh.
    cart_lock: RwLock<()>,
    /// Per-line guards serializing same-key intents across await points.
    line_guards: Mutex<HashMap<LineKey, Arc<AsyncMutex<()>>>>,
}

impl CartSynchronizer {
    /// Build a synchronizer and prime its canonical cart from the
    /// authoritative store.
    ///
    /// Priming never fails: local loads degrade to an empty cart inside the
    /// store, remote reads degrade inside the gateway. In remote mode the
    /// primed cart is also written through to the display cache.
    pub async fn start(
        mode: CartMode,
        owner: CustomerId,
        store: LocalStore,
        gateway: Arc<dyn CartGateway>,
        bus: Arc<InMemoryEventBus<CartChanged>>,
    ) -> Self {
        let initial = match mode {
            CartMode::Local => store.load_cart(owner),
            CartMode::Remote => {
                let cart = gateway.fetch_cart(owner).await;
                if let Err(err) = store.save_cart(&cart) {
                    tracing::warn!(error = %err, "failed to refresh the cart display cache");
                }
                cart
            }
        };
        tracing::debug!(%owner, %mode, lines = initial.len(), "cart synchronizer started");
        Self {
            mode,
            owner,
            store,
            gateway,
            bus,
            canonical: Mutex::new(initial),
            cart_lock: RwLock::new(()),
            line_guards: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> CartMode {
        self.mode
    }

    pub fn owner(&self) -> CustomerId {
        self.owner
    }

    /// The canonical cart. Consumers call this again after each
    /// [`CartChanged`]; the notification itself never carries the cart.
    pub fn cart(&self) -> Cart {
        self.snapshot()
    }

    /// Checkout totals derived from the canonical cart.
    pub fn totals(&self) -> CheckoutTotals {
        CheckoutTotals::from_cart(&self.lock_canonical())
    }

    /// Register a handler for cart-change notifications. Dropping the
    /// returned guard unsubscribes.
    pub fn subscribe(&self, handler: Handler<CartChanged>) -> Subscription {
        self.bus.subscribe(handler)
    }

    pub fn bus(&self) -> Arc<InMemoryEventBus<CartChanged>> {
        Arc::clone(&self.bus)
    }

    /// Add a line, merging quantities when it already exists.
    pub async fn add_item(&self, intent: AddItem) -> Result<Cart, SyncError> {
        if intent.item.quantity == 0 {
            return Err(DomainError::validation("quantity must be at least 1").into());
        }

        let intent_id = Uuid::now_v7();
        let key = intent.key();
        let _whole = self.cart_lock.read().await;
        let guard = self.line_guard(key);
        let _line = guard.lock().await;
        tracing::debug!(
            %intent_id,
            line = %key,
            quantity = intent.item.quantity,
            mode = %self.mode,
            "applying add intent"
        );

        let committed = match self.mode {
            CartMode::Local => {
                let mut next = self.snapshot();
                next.add(intent.item)?;
                self.store.save_cart(&next)?;
                next
            }
            CartMode::Remote => {
                let cart = self
                    .gateway
                    .add_item(self.owner, key.product_id, key.category, intent.item.quantity)
                    .await?;
                self.cache_display(&cart);
                cart
            }
        };

        self.commit(intent_id, committed.clone(), CartMutation::ItemAdded { line: key });
        Ok(committed)
    }

    /// Replace a line's quantity. Zero or below routes to [`Self::remove_item`].
    pub async fn update_quantity(&self, intent: UpdateQuantity) -> Result<Cart, SyncError> {
        if intent.quantity <= 0 {
            return self.remove_item(RemoveItem::new(intent.key)).await;
        }
        let quantity = u32::try_from(intent.quantity).unwrap_or(u32::MAX);

        let intent_id = Uuid::now_v7();
        let key = intent.key;
        let _whole = self.cart_lock.read().await;
        let guard = self.line_guard(key);
        let _line = guard.lock().await;
        tracing::debug!(%intent_id, line = %key, quantity, mode = %self.mode, "applying quantity update");

        let committed = match self.mode {
            CartMode::Local => {
                let mut next = self.snapshot();
                next.set_quantity(key, quantity)?;
                self.store.save_cart(&next)?;
                next
            }
            CartMode::Remote => {
                let cart = self
                    .gateway
                    .update_quantity(self.owner, key.product_id, key.category, quantity)
                    .await?;
                self.cache_display(&cart);
                cart
            }
        };

        self.commit(intent_id, committed.clone(), CartMutation::QuantityChanged { line: key });
        Ok(committed)
    }

    /// Drop a line. Removing a line that is already gone still commits (and
    /// so still notifies): the resulting cart is the state the caller asked
    /// for.
    pub async fn remove_item(&self, intent: RemoveItem) -> Result<Cart, SyncError> {
        let intent_id = Uuid::now_v7();
        let key = intent.key;
        let _whole = self.cart_lock.read().await;
        let guard = self.line_guard(key);
        let _line = guard.lock().await;
        tracing::debug!(%intent_id, line = %key, mode = %self.mode, "applying removal");

        let committed = match self.mode {
            CartMode::Local => {
                let mut next = self.snapshot();
                next.remove(key);
                self.store.save_cart(&next)?;
                next
            }
            CartMode::Remote => {
                self.gateway
                    .remove_item(self.owner, key.product_id, key.category)
                    .await?;
                // The ack is authoritative; drop the line from the canonical
                // copy instead of paying for a follow-up read that could
                // degrade to empty. `refresh` reconciles any other drift.
                let mut next = self.snapshot();
                next.remove(key);
                self.cache_display(&next);
                next
            }
        };

        self.commit(intent_id, committed.clone(), CartMutation::ItemRemoved { line: key });
        Ok(committed)
    }

    /// Empty the cart. The canonical cart comes up empty no matter what.
    ///
    /// In remote mode each line removal is attempted and failures are only
    /// logged: checkout completion abandons the cart either way, and a
    /// later `refresh` re-surfaces anything the service still holds.
    pub async fn clear(&self) -> Cart {
        let intent_id = Uuid::now_v7();
        let _whole = self.cart_lock.write().await;
        tracing::debug!(%intent_id, mode = %self.mode, "clearing the cart");

        if self.mode == CartMode::Remote {
            let keys: Vec<LineKey> = self
                .snapshot()
                .items()
                .iter()
                .map(CartLineItem::key)
                .collect();
            for key in keys {
                if let Err(err) = self
                    .gateway
                    .remove_item(self.owner, key.product_id, key.category)
                    .await
                {
                    tracing::warn!(line = %key, error = %err, "failed to clear a remote cart line");
                }
            }
        }
        if let Err(err) = self.store.clear_cart(self.owner) {
            tracing::warn!(error = %err, "failed to persist the cleared cart");
        }

        let next = Cart::empty(self.owner);
        self.commit(intent_id, next.clone(), CartMutation::Cleared);
        next
    }

    /// Reload the canonical cart from the authoritative store, discarding
    /// the in-memory copy. Publishes a [`CartMutation::Reloaded`] so
    /// consumers re-render.
    pub async fn refresh(&self) -> Cart {
        let intent_id = Uuid::now_v7();
        let _whole = self.cart_lock.write().await;
        tracing::debug!(%intent_id, mode = %self.mode, "refreshing the cart");

        let next = match self.mode {
            CartMode::Local => self.store.load_cart(self.owner),
            CartMode::Remote => {
                let cart = self.gateway.fetch_cart(self.owner).await;
                self.cache_display(&cart);
                cart
            }
        };

        self.commit(intent_id, next.clone(), CartMutation::Reloaded);
        next
    }

    /// Swap the canonical cart and announce the change. Exactly one
    /// notification per committed intent; rejected intents never get here.
    fn commit(&self, intent_id: Uuid, next: Cart, mutation: CartMutation) {
        *self.lock_canonical() = next;
        tracing::debug!(%intent_id, ?mutation, "cart intent committed");
        self.bus.publish(CartChanged::new(self.owner, mutation));
    }

    /// In remote mode the on-disk snapshot is only a display cache; a failed
    /// write must not fail an intent the service already committed.
    fn cache_display(&self, cart: &Cart) {
        if let Err(err) = self.store.save_cart(cart) {
            tracing::warn!(error = %err, "failed to refresh the cart display cache");
        }
    }

    fn line_guard(&self, key: LineKey) -> Arc<AsyncMutex<()>> {
        let mut guards = self
            .line_guards
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(guards.entry(key).or_default())
    }

    /// The canonical lock is only ever held for a field swap or a clone, so
    /// a poisoned guard still protects a complete value; recover it.
    fn lock_canonical(&self) -> MutexGuard<'_, Cart> {
        self.canonical.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Cart {
        self.lock_canonical().clone()
    }
}

impl fmt::Debug for CartSynchronizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartSynchronizer")
            .field("mode", &self.mode)
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_mode_parses_case_insensitively() {
        assert_eq!("local".parse::<CartMode>().unwrap(), CartMode::Local);
        assert_eq!("Remote".parse::<CartMode>().unwrap(), CartMode::Remote);
        assert_eq!(" LOCAL ".parse::<CartMode>().unwrap(), CartMode::Local);
    }

    #[test]
    fn unknown_cart_modes_are_rejected() {
        let err = "offline".parse::<CartMode>().unwrap_err();
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn cart_mode_round_trips_through_display() {
        for mode in [CartMode::Local, CartMode::Remote] {
            assert_eq!(mode.to_string().parse::<CartMode>().unwrap(), mode);
        }
    }
}
