//! Type-safe wrappers around the order store.

pub mod order_client;

pub use order_client::*;
