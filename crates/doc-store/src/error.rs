//! # Store Errors
//!
//! Errors shared by every store client and backend. A lost compare-and-swap is not in
//! here: it is reported as [`UpdateOutcome::NotMatched`](crate::UpdateOutcome).

/// Errors that can occur while talking to a document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable")]
    Unavailable,
    #[error("Store dropped response channel")]
    Dropped,
    #[error("Document error: {0}")]
    Document(Box<dyn std::error::Error + Send + Sync>),
    #[error("Unexpected store request: {0}")]
    Unexpected(String),
}
