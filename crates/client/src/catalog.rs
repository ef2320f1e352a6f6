//! Catalog read clients (books, clothes, phones).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopfront_core::{CartLineItem, Category, Price, ProductId, Variant};

/// Category-specific display attributes, as a superset with unset fields
/// absent (a book has an author, a phone has a brand, and so on).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
}

/// One catalog record, shared shape across the three services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i64,
    /// Image URL, named `url` on the wire.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(flatten)]
    pub attributes: ProductAttributes,
}

impl CatalogProduct {
    /// Capture this record as a cart-line draft. Display data (name, price,
    /// image, variant) is denormalized into the line at this point.
    pub fn to_line_item(&self, category: Category, quantity: u32) -> CartLineItem {
        if self.price.is_sign_negative() {
            tracing::warn!(product = %self.id, "negative price in catalog record; clamping to zero");
        }
        CartLineItem {
            product_id: self.id,
            category,
            name: self.name.clone(),
            unit_price: Price::clamped(self.price),
            image_ref: self.url.clone(),
            quantity,
            variant: Variant {
                size: self.attributes.size.clone(),
                color: self.attributes.color.clone(),
            },
        }
    }
}

/// Read-only client for the three catalog services.
///
/// Listings and details are display data; failures degrade to empty
/// results with a log line so browsing never hard-fails.
pub struct CatalogGateway {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogGateway {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn list_url(&self, category: Category) -> String {
        format!(
            "{}/{}/api/{}/",
            self.base_url,
            category.service_prefix(),
            category.as_str()
        )
    }

    /// All products in `category`; empty on any failure.
    pub async fn list(&self, category: Category) -> Vec<CatalogProduct> {
        let url = self.list_url(category);
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(%category, error = %err, "catalog read failed; substituting an empty listing");
                return Vec::new();
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(
                %category,
                status = resp.status().as_u16(),
                "catalog read returned an error status; substituting an empty listing"
            );
            return Vec::new();
        }
        match resp.json::<Vec<CatalogProduct>>().await {
            Ok(products) => products,
            Err(err) => {
                tracing::warn!(%category, error = %err, "catalog listing was unreadable; substituting an empty listing");
                Vec::new()
            }
        }
    }

    /// One product by id; `None` when missing or unreachable.
    pub async fn detail(&self, category: Category, id: ProductId) -> Option<CatalogProduct> {
        let url = format!("{}{}/", self.list_url(category), id);
        let resp = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                tracing::warn!(%category, %id, error = %err, "catalog detail read failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::warn!(
                %category,
                %id,
                status = resp.status().as_u16(),
                "catalog detail returned an error status"
            );
            return None;
        }
        match resp.json::<CatalogProduct>().await {
            Ok(product) => Some(product),
            Err(err) => {
                tracing::warn!(%category, %id, error = %err, "catalog detail was unreadable");
                None
            }
        }
    }
}
