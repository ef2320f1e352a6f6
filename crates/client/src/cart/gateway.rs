//! Remote cart boundary.

use std::sync::Arc;

use async_trait::async_trait;

use shopfront_core::{Cart, Category, CustomerId, ProductId};

use crate::error::CartOperationError;

/// Read/write access to a customer's remote cart.
///
/// Contract, uniform across implementations:
///
/// - **Reads degrade**: `fetch_cart` substitutes an empty cart on any
///   failure and logs it, so rendering never hard-fails on a read.
/// - **Writes surface errors** as [`CartOperationError`], so the caller can
///   leave its state untouched and offer a retry.
/// - **Removal is idempotent**: removing an absent line succeeds.
/// - `update_quantity` expects `quantity ≥ 1`; zero-or-below is routed to
///   removal before the gateway is involved.
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// The current remote cart for `owner`; empty on any read failure.
    async fn fetch_cart(&self, owner: CustomerId) -> Cart;

    /// Create a line or merge into an existing one; returns the updated
    /// cart.
    async fn add_item(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
        quantity: u32,
    ) -> Result<Cart, CartOperationError>;

    /// Replace a line's quantity; returns the updated cart.
    async fn update_quantity(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
        quantity: u32,
    ) -> Result<Cart, CartOperationError>;

    /// Delete a line. Succeeds whether or not the line existed.
    async fn remove_item(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
    ) -> Result<(), CartOperationError>;
}

#[async_trait]
impl<G> CartGateway for Arc<G>
where
    G: CartGateway + ?Sized,
{
    async fn fetch_cart(&self, owner: CustomerId) -> Cart {
        (**self).fetch_cart(owner).await
    }

    async fn add_item(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
        quantity: u32,
    ) -> Result<Cart, CartOperationError> {
        (**self).add_item(owner, product_id, category, quantity).await
    }

    async fn update_quantity(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
        quantity: u32,
    ) -> Result<Cart, CartOperationError> {
        (**self)
            .update_quantity(owner, product_id, category, quantity)
            .await
    }

    async fn remove_item(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
    ) -> Result<(), CartOperationError> {
        (**self).remove_item(owner, product_id, category).await
    }
}
