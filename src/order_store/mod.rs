//! Orders as store documents.

pub mod document;
pub mod error;

pub use error::*;

use crate::model::Order;
use doc_store::{StoreActor, StoreClient};

/// Creates a new Order store actor and its client.
pub fn new(buffer_size: usize) -> (StoreActor<Order>, StoreClient<Order>) {
    StoreActor::new(buffer_size)
}
