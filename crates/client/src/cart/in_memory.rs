//! In-memory cart service for tests/dev.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use shopfront_core::{Cart, CartLineItem, Category, CustomerId, LineKey, ProductId};

use crate::cart::gateway::CartGateway;
use crate::error::CartOperationError;

/// Failure to inject into the next gateway call.
#[derive(Debug, Clone)]
pub enum InjectedFailure {
    /// Behave as if the service were unreachable.
    Network,
    /// Reach the service but have it decline with this status.
    Rejected { status: u16, reason: String },
}

impl InjectedFailure {
    fn into_error(self) -> CartOperationError {
        match self {
            InjectedFailure::Network => {
                CartOperationError::NetworkFailure("injected network failure".to_string())
            }
            InjectedFailure::Rejected { status, reason } => {
                CartOperationError::ServerRejected { status, reason }
            }
        }
    }
}

/// In-memory stand-in for the remote cart service.
///
/// Same observable contract as the HTTP gateway: reads degrade to empty
/// carts, removal is idempotent, and writes resolve display data from
/// seeded products the way the real service resolves its own product rows.
/// One-shot failures can be injected to exercise rejection paths.
#[derive(Debug, Default)]
pub struct InMemoryCartService {
    products: Mutex<HashMap<LineKey, CartLineItem>>,
    carts: Mutex<HashMap<CustomerId, Cart>>,
    fail_next: Mutex<Option<InjectedFailure>>,
}

impl InMemoryCartService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a product row the service can resolve display data from.
    /// The template's quantity is ignored.
    pub fn seed_product(&self, template: CartLineItem) {
        if let Ok(mut products) = self.products.lock() {
            products.insert(template.key(), template);
        }
    }

    /// Replace the stored cart for its owner wholesale.
    pub fn seed_cart(&self, cart: Cart) {
        if let Ok(mut carts) = self.carts.lock() {
            carts.insert(cart.owner(), cart);
        }
    }

    /// Arrange for the next call (read or write) to fail.
    pub fn fail_next(&self, failure: InjectedFailure) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(failure);
        }
    }

    /// The cart as the service currently stores it, for assertions.
    pub fn stored_cart(&self, owner: CustomerId) -> Cart {
        self.carts
            .lock()
            .ok()
            .and_then(|carts| carts.get(&owner).cloned())
            .unwrap_or_else(|| Cart::empty(owner))
    }

    fn take_failure(&self) -> Option<InjectedFailure> {
        self.fail_next.lock().ok().and_then(|mut slot| slot.take())
    }

    fn lock_carts(&self) -> Result<MutexGuard<'_, HashMap<CustomerId, Cart>>, CartOperationError> {
        self.carts
            .lock()
            .map_err(|_| CartOperationError::NetworkFailure("cart state lock poisoned".to_string()))
    }

    fn product_template(&self, key: LineKey) -> Option<CartLineItem> {
        self.products
            .lock()
            .ok()
            .and_then(|products| products.get(&key).cloned())
    }
}

#[async_trait]
impl CartGateway for InMemoryCartService {
    async fn fetch_cart(&self, owner: CustomerId) -> Cart {
        if let Some(failure) = self.take_failure() {
            tracing::warn!(%owner, error = %failure.into_error(), "cart read failed; substituting an empty cart");
            return Cart::empty(owner);
        }
        self.stored_cart(owner)
    }

    async fn add_item(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
        quantity: u32,
    ) -> Result<Cart, CartOperationError> {
        if let Some(failure) = self.take_failure() {
            return Err(failure.into_error());
        }
        if quantity == 0 {
            return Err(CartOperationError::ServerRejected {
                status: 400,
                reason: "quantity must be positive".to_string(),
            });
        }
        let key = LineKey::new(product_id, category);
        let mut template =
            self.product_template(key)
                .ok_or_else(|| CartOperationError::ServerRejected {
                    status: 404,
                    reason: format!("unknown product {key}"),
                })?;
        template.quantity = quantity;

        let mut carts = self.lock_carts()?;
        let cart = carts.entry(owner).or_insert_with(|| Cart::empty(owner));
        cart.add(template)
            .map_err(|err| CartOperationError::ServerRejected {
                status: 400,
                reason: err.to_string(),
            })?;
        Ok(cart.clone())
    }

    async fn update_quantity(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
        quantity: u32,
    ) -> Result<Cart, CartOperationError> {
        if let Some(failure) = self.take_failure() {
            return Err(failure.into_error());
        }
        if quantity == 0 {
            return Err(CartOperationError::ServerRejected {
                status: 400,
                reason: "quantity must be positive".to_string(),
            });
        }
        let key = LineKey::new(product_id, category);
        let mut carts = self.lock_carts()?;
        let cart = carts.entry(owner).or_insert_with(|| Cart::empty(owner));
        cart.set_quantity(key, quantity)
            .map_err(|err| CartOperationError::ServerRejected {
                status: 404,
                reason: err.to_string(),
            })?;
        Ok(cart.clone())
    }

    async fn remove_item(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
    ) -> Result<(), CartOperationError> {
        if let Some(failure) = self.take_failure() {
            return Err(failure.into_error());
        }
        let mut carts = self.lock_carts()?;
        if let Some(cart) = carts.get_mut(&owner) {
            cart.remove(LineKey::new(product_id, category));
        }
        Ok(())
    }
}
