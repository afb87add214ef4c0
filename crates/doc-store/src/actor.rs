//! # Store Actor
//!
//! This module defines the `StoreActor`, the task that owns every document of one type.
//! It implements the "Server" side of the Actor Model: requests are processed one at a
//! time, so a conditional update's "test the filter, then apply the patch" can never
//! interleave with another writer.

use crate::client::StoreClient;
use crate::document::Document;
use crate::error::StoreError;
use crate::message::{StoreRequest, UpdateOutcome};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The actor that owns a collection of documents.
///
/// # Concurrency Model
/// Any number of `StoreClient` clones may send requests concurrently, but the actor
/// handles them sequentially in a loop. That gives per-document compare-and-swap for
/// free: `UpdateOne` evaluates its filter and applies its patch within a single message,
/// so two writers racing on the same document are serialized and only the first one
/// whose filter still matches wins.
///
/// ```rust
/// use doc_store::{Document, StoreActor, UpdateOutcome};
///
/// #[derive(Clone, Debug)] struct Counter { id: u32, value: u32 }
/// #[derive(Debug)] struct Expect(u32);
/// #[derive(Debug, thiserror::Error)] #[error("counter")] struct CounterError;
///
/// impl Document for Counter {
///     type Id = u32; type Create = u32; type Filter = Expect; type Patch = u32;
///     type Error = CounterError;
///     fn from_create_params(id: u32, value: u32) -> Result<Self, CounterError> { Ok(Self { id, value }) }
///     fn id(&self) -> &u32 { &self.id }
///     fn matches(&self, f: &Expect) -> bool { self.value == f.0 }
///     fn apply(&mut self, value: u32) -> Result<(), CounterError> { self.value = value; Ok(()) }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (actor, client) = StoreActor::<Counter>::new(10);
///     tokio::spawn(actor.run());
///
///     client.insert(0).await.unwrap();
///     assert_eq!(client.update_one(Expect(0), 1).await.unwrap(), UpdateOutcome::Applied);
///     assert_eq!(client.update_one(Expect(0), 2).await.unwrap(), UpdateOutcome::NotMatched);
/// }
/// ```
pub struct StoreActor<T: Document> {
    receiver: mpsc::Receiver<StoreRequest<T>>,
    documents: BTreeMap<T::Id, T>,
    next_id: u32,
}

impl<T: Document> StoreActor<T> {
    /// Creates a new `StoreActor` and its associated `StoreClient`.
    ///
    /// `buffer_size` is the capacity of the request channel. When it is full, client
    /// calls wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, StoreClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            documents: BTreeMap::new(),
            next_id: 1,
        };
        let client = StoreClient::new(sender);
        (actor, client)
    }

    /// Runs the actor's event loop until every client has been dropped.
    pub async fn run(mut self) {
        // Just the type name (e.g. "Order" instead of "kitchen_orders::model::order::Order")
        let document_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(document_type, "Store started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                StoreRequest::Insert { params, respond_to } => {
                    debug!(document_type, ?params, "Insert");
                    let id = T::Id::from(self.next_id);

                    match T::from_create_params(id.clone(), params) {
                        Ok(document) => {
                            self.next_id += 1;
                            self.documents.insert(id.clone(), document.clone());
                            info!(document_type, %id, size = self.documents.len(), "Inserted");
                            let _ = respond_to.send(Ok(document));
                        }
                        Err(e) => {
                            warn!(document_type, error = %e, "Insert failed");
                            let _ = respond_to.send(Err(StoreError::Document(Box::new(e))));
                        }
                    }
                }
                StoreRequest::Get { id, respond_to } => {
                    let document = self.documents.get(&id).cloned();
                    debug!(document_type, %id, found = document.is_some(), "Get");
                    let _ = respond_to.send(Ok(document));
                }
                StoreRequest::Find {
                    filter,
                    limit,
                    respond_to,
                } => {
                    let found: Vec<T> = self
                        .documents
                        .values()
                        .filter(|document| document.matches(&filter))
                        .take(limit.unwrap_or(usize::MAX))
                        .cloned()
                        .collect();
                    debug!(document_type, ?filter, ?limit, found = found.len(), "Find");
                    let _ = respond_to.send(Ok(found));
                }
                StoreRequest::UpdateOne {
                    filter,
                    patch,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.update_one(document_type, filter, patch));
                }
            }
        }

        info!(document_type, size = self.documents.len(), "Shutdown");
    }

    fn update_one(
        &mut self,
        document_type: &str,
        filter: T::Filter,
        patch: T::Patch,
    ) -> Result<UpdateOutcome, StoreError> {
        let Some(current) = self
            .documents
            .values_mut()
            .find(|document| document.matches(&filter))
        else {
            debug!(document_type, ?filter, "Update matched nothing");
            return Ok(UpdateOutcome::NotMatched);
        };

        // Patch a copy so a rejected patch leaves the stored document untouched.
        let mut patched = current.clone();
        let id = patched.id().clone();
        debug!(document_type, %id, ?patch, "Update");
        if let Err(e) = patched.apply(patch) {
            warn!(document_type, %id, error = %e, "Update failed");
            return Err(StoreError::Document(Box::new(e)));
        }
        *current = patched;
        debug!(document_type, %id, "Updated");
        Ok(UpdateOutcome::Applied)
    }
}
