//! Error types for order operations.

use crate::model::OrderId;
use doc_store::StoreError;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The creation request carried no dish.
    #[error("Missing dish")]
    MissingDish,

    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The store could not complete the request.
    #[error("Order store error: {0}")]
    Store(#[from] StoreError),
}
