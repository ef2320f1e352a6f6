//! Order service client.
//!
//! The order service deploys separately from the API gateway and therefore
//! has its own base URL.

use serde::Serialize;

use shopfront_core::{Cart, Category, CustomerId, OrderId, ProductId};

use crate::error::GatewayError;

/// One line of an order submission (the order service's snake_case shape).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub category: Category,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
struct PlaceOrderRequest {
    customer_id: CustomerId,
    items: Vec<OrderItem>,
}

/// Project the cart's lines into order items. Prices are not sent; the
/// order service reprices server-side.
pub fn order_items_from(cart: &Cart) -> Vec<OrderItem> {
    cart.items()
        .iter()
        .map(|line| OrderItem {
            category: line.category,
            product_id: line.product_id,
            product_name: line.name.clone(),
            quantity: line.quantity,
        })
        .collect()
}

/// Different deployments have labelled the created order's id differently;
/// probe the known spellings.
fn extract_order_id(body: &serde_json::Value) -> Option<OrderId> {
    body.get("id")
        .or_else(|| body.get("order_id"))
        .or_else(|| body.get("order").and_then(|order| order.get("id")))
        .and_then(serde_json::Value::as_u64)
        .map(OrderId::new)
}

/// Client for the order service.
pub struct OrderGateway {
    client: reqwest::Client,
    base_url: String,
}

impl OrderGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Submit the cart's lines as a new order; returns the created order's
    /// id.
    pub async fn place_order(
        &self,
        owner: CustomerId,
        cart: &Cart,
    ) -> Result<OrderId, GatewayError> {
        let url = format!("{}/order/orders/", self.base_url);
        let payload = PlaceOrderRequest {
            customer_id: owner,
            items: order_items_from(cart),
        };
        let resp = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(GatewayError::network)?;

        if !resp.status().is_success() {
            return Err(GatewayError::api(resp).await);
        }

        let body: serde_json::Value = resp.json().await.map_err(GatewayError::parse)?;
        extract_order_id(&body)
            .ok_or_else(|| GatewayError::Parse("order response missing an order id".to_string()))
    }
}
