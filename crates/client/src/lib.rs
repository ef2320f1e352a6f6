//! `shopfront-client` — typed clients for the storefront's services.
//!
//! One gateway per backing service. A shared policy runs through all of
//! them: **reads degrade** (failures become empty results with a log line)
//! while **writes surface typed errors** the caller can act on.

pub mod cart;
pub mod catalog;
pub mod comments;
pub mod customer;
pub mod error;
pub mod orders;
pub mod payments;

pub use cart::{CartGateway, HttpCartGateway, InMemoryCartService, InjectedFailure};
pub use catalog::{CatalogGateway, CatalogProduct, ProductAttributes};
pub use comments::{Comment, CommentGateway, NewComment};
pub use customer::{CustomerGateway, Registration};
pub use error::{CartOperationError, GatewayError};
pub use orders::{OrderGateway, OrderItem, order_items_from};
pub use payments::{PaymentGateway, PaymentMethod};
