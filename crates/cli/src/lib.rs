//! `shopfront-cli` — command-line front end for the storefront.
//!
//! One invocation wires the local store, the session, the service gateways
//! and the cart synchronizer, runs a single command against them, and
//! exits. Persisted state (cart snapshot, session) carries across
//! invocations through the local store.

pub mod app;
pub mod commands;
pub mod config;
pub mod telemetry;
