//! HTTP implementation of the cart boundary.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopfront_core::{Cart, CartLineItem, Category, CustomerId, Price, ProductId, Variant};

use crate::cart::gateway::CartGateway;
use crate::error::CartOperationError;

/// Gateway speaking the cart service's REST dialect.
///
/// The service nests read responses as `{"cart": {"items": [...]}}`,
/// takes camelCase write payloads, and addresses removals by path:
/// `DELETE {base}/cart/{owner}/remove/{category}/{product_id}/`.
pub struct HttpCartGateway {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpCartGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn with_token(
        client: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            token: Some(token.into()),
        }
    }

    /// Attach the stored bearer token. Writes carry it; reads go out
    /// anonymous, matching the cart service's contract.
    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            req.bearer_auth(token)
        } else {
            req
        }
    }

    /// Interpret a write response: non-2xx is a rejection; a 2xx body that
    /// carries the updated cart is used directly, anything else triggers a
    /// re-read.
    async fn updated_cart_from(
        &self,
        owner: CustomerId,
        resp: reqwest::Response,
    ) -> Result<Cart, CartOperationError> {
        if !resp.status().is_success() {
            return Err(CartOperationError::rejected(resp).await);
        }
        match resp.json::<serde_json::Value>().await {
            Ok(body) => {
                if let Some(cart) = parse_cart_body(owner, &body) {
                    return Ok(cart);
                }
                tracing::debug!(%owner, "write response had no cart payload; re-reading the cart");
            }
            Err(err) => {
                tracing::debug!(%owner, error = %err, "write response was not JSON; re-reading the cart");
            }
        }
        Ok(self.fetch_cart(owner).await)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddItemRequest {
    product_id: ProductId,
    quantity: u32,
    customer_id: CustomerId,
    category: Category,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateQuantityRequest {
    customer_id: CustomerId,
    product_id: ProductId,
    quantity: u32,
    category: Category,
}

/// Line-item record as the cart service returns it. Rows also carry their
/// own `id`; only `product_id` plus `product_type` participate in identity,
/// the rest is display data.
#[derive(Debug, Clone, Deserialize)]
struct CartItemRecord {
    product_id: u64,
    product_type: Category,
    name: String,
    price: Decimal,
    #[serde(default)]
    image_urls: Option<String>,
    quantity: u32,
    #[serde(default)]
    size: Option<String>,
    #[serde(default)]
    color: Option<String>,
}

impl CartItemRecord {
    fn into_line_item(self) -> CartLineItem {
        if self.price.is_sign_negative() {
            tracing::warn!(
                product = self.product_id,
                "negative price in cart payload; clamping to zero"
            );
        }
        CartLineItem {
            product_id: ProductId::new(self.product_id),
            category: self.product_type,
            name: self.name,
            unit_price: Price::clamped(self.price),
            image_ref: self.image_urls,
            quantity: self.quantity,
            variant: Variant {
                size: self.size,
                color: self.color,
            },
        }
    }
}

/// Extract a cart from a service payload.
///
/// Accepts both the read shape `{"cart": {"items": [...]}}` and a bare
/// `{"items": [...]}`. Unusable records are skipped with a log line rather
/// than failing the whole payload. `None` means no items array was found
/// at all.
fn parse_cart_body(owner: CustomerId, body: &serde_json::Value) -> Option<Cart> {
    let items = body.get("cart").unwrap_or(body).get("items")?.as_array()?;

    let mut cart = Cart::empty(owner);
    for raw in items {
        let record: CartItemRecord = match serde_json::from_value(raw.clone()) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(%owner, error = %err, "skipping unusable line in cart payload");
                continue;
            }
        };
        if record.quantity == 0 {
            tracing::warn!(
                %owner,
                product = record.product_id,
                "skipping zero-quantity line in cart payload"
            );
            continue;
        }
        // `add` only rejects zero quantities, which were skipped above.
        let _ = cart.add(record.into_line_item());
    }
    Some(cart)
}

#[async_trait]
impl CartGateway for HttpCartGateway {
    async fn fetch_cart(&self, owner: CustomerId) -> Cart {
        let url = format!("{}/cart/{}/", self.base_url, owner);
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(%owner, error = %err, "cart read failed; substituting an empty cart");
                return Cart::empty(owner);
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(
                %owner,
                status = resp.status().as_u16(),
                "cart read returned an error status; substituting an empty cart"
            );
            return Cart::empty(owner);
        }
        let body: serde_json::Value = match resp.json().await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(%owner, error = %err, "cart read body was unreadable; substituting an empty cart");
                return Cart::empty(owner);
            }
        };
        match parse_cart_body(owner, &body) {
            Some(cart) => cart,
            None => {
                tracing::debug!(%owner, "cart response carried no items; treating as empty");
                Cart::empty(owner)
            }
        }
    }

    async fn add_item(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
        quantity: u32,
    ) -> Result<Cart, CartOperationError> {
        let url = format!("{}/cart/cart/", self.base_url);
        let payload = AddItemRequest {
            product_id,
            quantity,
            customer_id: owner,
            category,
        };
        let resp = self
            .authorized(self.client.post(&url).json(&payload))
            .send()
            .await
            .map_err(CartOperationError::network)?;
        self.updated_cart_from(owner, resp).await
    }

    async fn update_quantity(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
        quantity: u32,
    ) -> Result<Cart, CartOperationError> {
        let url = format!("{}/cart/cart-update/", self.base_url);
        let payload = UpdateQuantityRequest {
            customer_id: owner,
            product_id,
            quantity,
            category,
        };
        let resp = self
            .authorized(self.client.patch(&url).json(&payload))
            .send()
            .await
            .map_err(CartOperationError::network)?;
        self.updated_cart_from(owner, resp).await
    }

    async fn remove_item(
        &self,
        owner: CustomerId,
        product_id: ProductId,
        category: Category,
    ) -> Result<(), CartOperationError> {
        let url = format!(
            "{}/cart/{}/remove/{}/{}/",
            self.base_url, owner, category, product_id
        );
        let resp = self
            .authorized(self.client.delete(&url))
            .send()
            .await
            .map_err(CartOperationError::network)?;

        // The line being gone already still counts as removed.
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::debug!(%owner, %category, %product_id, "line was already absent remotely");
            return Ok(());
        }
        if !resp.status().is_success() {
            return Err(CartOperationError::rejected(resp).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> CustomerId {
        CustomerId::new(7)
    }

    #[test]
    fn add_request_serializes_camel_case() {
        let payload = AddItemRequest {
            product_id: ProductId::new(12),
            quantity: 2,
            customer_id: CustomerId::GUEST,
            category: Category::Books,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "productId": 12,
                "quantity": 2,
                "customerId": 1,
                "category": "books"
            })
        );
    }

    #[test]
    fn update_request_serializes_camel_case() {
        let payload = UpdateQuantityRequest {
            customer_id: CustomerId::new(7),
            product_id: ProductId::new(3),
            quantity: 5,
            category: Category::Phones,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "customerId": 7,
                "productId": 3,
                "quantity": 5,
                "category": "phones"
            })
        );
    }

    #[test]
    fn parses_the_nested_read_shape() {
        let body = serde_json::json!({
            "cart": {
                "items": [
                    {
                        "id": 55,
                        "product_id": 12,
                        "product_type": "books",
                        "name": "Dune",
                        "price": 19.99,
                        "image_urls": "https://img/dune.png",
                        "quantity": 3
                    }
                ]
            }
        });

        let cart = parse_cart_body(owner(), &body).unwrap();
        assert_eq!(cart.len(), 1);
        let line = &cart.items()[0];
        assert_eq!(line.product_id, ProductId::new(12));
        assert_eq!(line.category, Category::Books);
        assert_eq!(line.unit_price.amount(), "19.99".parse().unwrap());
        assert_eq!(cart.subtotal(), "59.97".parse().unwrap());
    }

    #[test]
    fn parses_the_bare_write_shape() {
        let body = serde_json::json!({
            "items": [
                { "product_id": 1, "product_type": "clothes", "name": "Tee",
                  "price": 9.5, "quantity": 1, "size": "M", "color": "navy" }
            ]
        });

        let cart = parse_cart_body(owner(), &body).unwrap();
        let line = &cart.items()[0];
        assert_eq!(line.variant.size.as_deref(), Some("M"));
        assert_eq!(line.variant.color.as_deref(), Some("navy"));
    }

    #[test]
    fn skips_unusable_and_zero_quantity_records() {
        let body = serde_json::json!({
            "cart": {
                "items": [
                    { "product_id": 1, "product_type": "books", "name": "ok", "price": 1.0, "quantity": 2 },
                    { "product_id": "oops", "product_type": "books", "name": "bad", "price": 1.0, "quantity": 1 },
                    { "product_id": 2, "product_type": "books", "name": "gone", "price": 1.0, "quantity": 0 }
                ]
            }
        });

        let cart = parse_cart_body(owner(), &body).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].product_id, ProductId::new(1));
    }

    #[test]
    fn merges_duplicate_keys_in_payload() {
        let body = serde_json::json!({
            "cart": {
                "items": [
                    { "product_id": 1, "product_type": "books", "name": "a", "price": 2.0, "quantity": 1 },
                    { "product_id": 1, "product_type": "books", "name": "a", "price": 2.0, "quantity": 2 }
                ]
            }
        });

        let cart = parse_cart_body(owner(), &body).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn negative_prices_clamp_to_zero() {
        let body = serde_json::json!({
            "cart": {
                "items": [
                    { "product_id": 1, "product_type": "books", "name": "a", "price": -5.0, "quantity": 1 }
                ]
            }
        });

        let cart = parse_cart_body(owner(), &body).unwrap();
        assert_eq!(cart.items()[0].unit_price, Price::ZERO);
    }

    #[test]
    fn missing_items_array_yields_none() {
        assert!(parse_cart_body(owner(), &serde_json::json!({})).is_none());
        assert!(parse_cart_body(owner(), &serde_json::json!({ "cart": null })).is_none());
    }
}
