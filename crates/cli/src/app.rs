//! Application wiring.

use std::sync::Arc;

use anyhow::Context;

use shopfront_client::{
    CartGateway, CatalogGateway, CommentGateway, CustomerGateway, HttpCartGateway, OrderGateway,
    PaymentGateway,
};
use shopfront_events::InMemoryEventBus;
use shopfront_store::{LocalStore, SessionManager};
use shopfront_sync::CartSynchronizer;

use crate::config::Config;

/// Everything a command needs, wired once per invocation.
pub struct App {
    pub config: Config,
    pub store: LocalStore,
    pub session: SessionManager,
    pub catalog: CatalogGateway,
    pub customers: CustomerGateway,
    pub orders: OrderGateway,
    pub payments: PaymentGateway,
    pub comments: CommentGateway,
    pub cart: Arc<CartSynchronizer>,
}

impl App {
    /// Open the local store, restore the session, and wire every gateway
    /// onto one shared HTTP client.
    ///
    /// The cart gateway carries the stored bearer token when a session
    /// exists, so remote cart calls act for the signed-in customer.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let store = LocalStore::open(config.data_dir.clone())
            .context("failed to open the local data directory")?;
        let session = SessionManager::new(store.clone());
        let owner = session.owner();

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build the HTTP client")?;

        let cart_gateway: Arc<dyn CartGateway> = match session.token() {
            Some(token) => Arc::new(HttpCartGateway::with_token(
                client.clone(),
                config.api_base.clone(),
                token,
            )),
            None => Arc::new(HttpCartGateway::new(client.clone(), config.api_base.clone())),
        };

        let cart = CartSynchronizer::start(
            config.cart_mode,
            owner,
            store.clone(),
            cart_gateway,
            Arc::new(InMemoryEventBus::new()),
        )
        .await;

        Ok(Self {
            store,
            session,
            catalog: CatalogGateway::new(client.clone(), config.api_base.clone()),
            customers: CustomerGateway::new(client.clone(), config.api_base.clone()),
            orders: OrderGateway::new(client.clone(), config.order_api_base.clone()),
            payments: PaymentGateway::new(client.clone(), config.api_base.clone()),
            comments: CommentGateway::new(client, config.api_base.clone()),
            cart: Arc::new(cart),
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use shopfront_core::CustomerId;
    use shopfront_sync::CartMode;

    use super::*;

    #[tokio::test]
    async fn builds_against_an_empty_data_dir_as_the_guest() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            api_base: "http://127.0.0.1:8001".to_string(),
            order_api_base: "http://127.0.0.1:8006".to_string(),
            cart_mode: CartMode::Local,
            data_dir: dir.path().join("shopfront"),
            request_timeout: Duration::from_secs(10),
        };

        let app = App::build(config).await.unwrap();

        assert_eq!(app.session.owner(), CustomerId::GUEST);
        assert_eq!(app.cart.mode(), CartMode::Local);
        assert!(app.cart.cart().is_empty());
    }
}
