//! # DocumentStore Trait
//!
//! The seam between code that needs durable documents and whatever keeps them. Callers
//! take `S: DocumentStore<T>` instead of a concrete client, so the same logic runs against
//! the [`StoreActor`](crate::StoreActor) in production and against
//! [`MockStore`](crate::mock::MockStore) when a test needs to inject failures.
//!
//! # Example
//!
//! ```rust
//! use doc_store::{Document, DocumentStore, StoreActor, StoreError};
//!
//! #[derive(Clone, Debug)] struct Note { id: u32, text: String }
//! #[derive(Debug, thiserror::Error)] #[error("note")] struct NoteError;
//!
//! impl Document for Note {
//!     type Id = u32; type Create = String; type Filter = (); type Patch = String;
//!     type Error = NoteError;
//!     fn from_create_params(id: u32, text: String) -> Result<Self, NoteError> { Ok(Self { id, text }) }
//!     fn id(&self) -> &u32 { &self.id }
//!     fn matches(&self, _: &()) -> bool { true }
//!     fn apply(&mut self, text: String) -> Result<(), NoteError> { self.text = text; Ok(()) }
//! }
//!
//! // Generic over any backend.
//! async fn count_notes<S: DocumentStore<Note>>(store: &S) -> Result<usize, StoreError> {
//!     Ok(store.find((), None).await?.len())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = StoreActor::<Note>::new(10);
//!     tokio::spawn(actor.run());
//!     client.insert("hello".to_string()).await.unwrap();
//!     assert_eq!(count_notes(&client).await.unwrap(), 1);
//! }
//! ```
use crate::{Document, StoreClient, StoreError, UpdateOutcome};
use async_trait::async_trait;

/// The query/update primitives a backend must provide.
///
/// `update_one` is the coordination primitive: it must evaluate the filter and apply the
/// patch atomically with respect to other writers of the same document. A backend without
/// native document-level compare-and-swap has to emulate it, e.g. with a version token
/// included in the filter.
#[async_trait]
pub trait DocumentStore<T: Document>: Send + Sync {
    /// Stores a new document and returns it with its assigned id.
    async fn insert(&self, params: T::Create) -> Result<T, StoreError>;

    /// Fetches a document by id.
    async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError>;

    /// Runs a filtered query, returning at most `limit` documents when given.
    async fn find(&self, filter: T::Filter, limit: Option<usize>) -> Result<Vec<T>, StoreError>;

    /// Conditionally patches one document.
    async fn update_one(&self, filter: T::Filter, patch: T::Patch)
        -> Result<UpdateOutcome, StoreError>;

    /// Whether the backend is currently reachable.
    fn is_connected(&self) -> bool {
        true
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for StoreClient<T> {
    #[tracing::instrument(skip(self))]
    async fn insert(&self, params: T::Create) -> Result<T, StoreError> {
        tracing::debug!("Sending request");
        StoreClient::insert(self, params).await
    }

    async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        StoreClient::get(self, id).await
    }

    async fn find(&self, filter: T::Filter, limit: Option<usize>) -> Result<Vec<T>, StoreError> {
        StoreClient::find(self, filter, limit).await
    }

    async fn update_one(
        &self,
        filter: T::Filter,
        patch: T::Patch,
    ) -> Result<UpdateOutcome, StoreError> {
        StoreClient::update_one(self, filter, patch).await
    }

    fn is_connected(&self) -> bool {
        StoreClient::is_connected(self)
    }
}
