//! # Store Messages
//!
//! This module defines the messages exchanged between the `StoreClient` and the
//! `StoreActor`, plus the outcome type of a conditional update.

use crate::document::Document;
use crate::error::StoreError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the store actor.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

/// Result of a conditional single-document update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A document matched the filter and the patch was applied to it.
    Applied,
    /// No document matched the filter at write time. Nothing was changed.
    NotMatched,
}

impl UpdateOutcome {
    pub fn is_applied(self) -> bool {
        matches!(self, UpdateOutcome::Applied)
    }
}

/// Request sent to the store actor.
///
/// The set is deliberately small: a store that can insert, read, run a bounded filtered
/// query, and patch one document under a predicate is enough to coordinate concurrent
/// writers without any lock outside the store.
#[derive(Debug)]
pub enum StoreRequest<T: Document> {
    Insert {
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Find {
        filter: T::Filter,
        limit: Option<usize>,
        respond_to: Response<Vec<T>>,
    },
    UpdateOne {
        filter: T::Filter,
        patch: T::Patch,
        respond_to: Response<UpdateOutcome>,
    },
}
