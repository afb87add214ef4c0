//! # Doc Store
//!
//! A small document store built on the **Actor Model**: one Tokio task owns every
//! document of a type, and any number of cloneable clients talk to it over a channel.
//!
//! ## Why an Actor?
//!
//! The store's job is to be the single place where concurrent writers meet. Because the
//! actor handles one request at a time, a conditional update ("patch this document only
//! if it still matches this filter") is atomic without any lock in the caller. Callers
//! coordinate purely through those per-document compare-and-swap writes.
//!
//! ## Architecture Overview
//!
//! 1. **Document Layer** ([`Document`]) - your record type: how it is built, filtered and patched
//! 2. **Runtime Layer** ([`StoreActor`]) - owns the documents and serializes requests
//! 3. **Interface Layer** ([`StoreClient`], [`DocumentStore`]) - async, type-safe access
//!
//! ## Operations
//!
//! | Operation | Returns | Notes |
//! |-----------|---------|-------|
//! | `insert` | the stored document | id assigned from a `u32` sequence |
//! | `get` | `Option<T>` | |
//! | `find(filter, limit)` | `Vec<T>` in id order | `limit` bounds the batch |
//! | `update_one(filter, patch)` | [`UpdateOutcome`] | `NotMatched` is not an error |
//!
//! ## Testing
//!
//! [`mock::MockStore`] implements [`DocumentStore`] with queued canned responses, for
//! exercising callers' error paths without an actor.
//!
//! ## Shutdown
//!
//! When the last client is dropped the actor's channel closes; the actor logs its final
//! size and its task completes.

pub mod actor;
pub mod client;
pub mod document;
pub mod error;
pub mod message;
pub mod mock;
pub mod store_trait;

// Re-export core types for convenience
pub use actor::StoreActor;
pub use client::StoreClient;
pub use document::Document;
pub use error::StoreError;
pub use message::{Response, StoreRequest, UpdateOutcome};
pub use store_trait::DocumentStore;
