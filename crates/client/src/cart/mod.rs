//! Remote cart boundary: the gateway trait plus its HTTP and in-memory
//! implementations.

pub mod gateway;
pub mod http;
pub mod in_memory;

pub use gateway::CartGateway;
pub use http::HttpCartGateway;
pub use in_memory::{InMemoryCartService, InjectedFailure};
