//! # Document Trait
//!
//! The `Document` trait is the contract every record type must satisfy to be kept by a
//! [`StoreActor`](crate::StoreActor). It names the associated types for ids, insertion
//! payloads, predicates and patches, and the three hooks the store calls: building a
//! document from its payload, testing it against a filter, and applying a patch.
//!
//! # Filters and Patches
//!
//! The store never inspects a document's fields itself. A `Filter` is an opaque predicate
//! the document evaluates against its own state, and a `Patch` is an opaque set/unset
//! description the document executes on itself. This keeps the store generic while still
//! letting a caller express "update this record only if it still looks like what I read"
//! (a compare-and-swap over whichever fields the filter names).

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record type must implement to be kept by a `StoreActor`.
///
/// # Ids
/// Ids are assigned by the store from a `u32` sequence, so `Id` must be buildable from
/// one. They must also be ordered: the store keeps documents in id order, which makes
/// `find` results and the "first match" of `update_one` deterministic.
pub trait Document: Clone + Send + Sync + 'static {
    /// The unique identifier assigned at insertion. Immutable afterwards.
    type Id: Ord + Eq + Hash + Clone + Send + Sync + Display + Debug + From<u32>;

    /// The data required to insert a new document (everything except the id).
    type Create: Send + Sync + Debug;

    /// Predicate evaluated by [`Document::matches`].
    type Filter: Send + Sync + Debug;

    /// Mutation executed by [`Document::apply`].
    type Patch: Send + Sync + Debug;

    /// The error type for this document.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full document from the store-assigned id and the payload.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// The id this document was stored under.
    fn id(&self) -> &Self::Id;

    /// Returns true if the document satisfies every predicate in `filter`.
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Applies `patch` in place.
    ///
    /// On error the store discards the partially patched copy, so implementations do not
    /// need to roll back.
    fn apply(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
}
