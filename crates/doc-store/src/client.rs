//! # Store Client
//!
//! This module defines the cloneable handle used to talk to a `StoreActor`.

use crate::document::Document;
use crate::error::StoreError;
use crate::message::{StoreRequest, UpdateOutcome};
use tokio::sync::{mpsc, oneshot};

/// A type-safe client for a `StoreActor`.
///
/// Holds only a sender, so cloning is cheap and clones can be handed to any number of
/// tasks. Each call sends one request and waits for the reply on a oneshot channel.
pub struct StoreClient<T: Document> {
    sender: mpsc::Sender<StoreRequest<T>>,
}

// Manual impl: deriving would demand `T: Clone` on the sender's behalf, which it doesn't need.
impl<T: Document> Clone for StoreClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Document> StoreClient<T> {
    pub fn new(sender: mpsc::Sender<StoreRequest<T>>) -> Self {
        Self { sender }
    }

    /// True while the store actor is running and accepting requests.
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }

    pub async fn insert(&self, params: T::Create) -> Result<T, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Insert { params, respond_to })
            .await
            .map_err(|_| StoreError::Unavailable)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Get { id, respond_to })
            .await
            .map_err(|_| StoreError::Unavailable)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    /// Returns matching documents in id order, at most `limit` of them when given.
    pub async fn find(
        &self,
        filter: T::Filter,
        limit: Option<usize>,
    ) -> Result<Vec<T>, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::Find {
                filter,
                limit,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::Unavailable)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }

    /// Applies `patch` to the first document matching `filter`, if any.
    pub async fn update_one(
        &self,
        filter: T::Filter,
        patch: T::Patch,
    ) -> Result<UpdateOutcome, StoreError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(StoreRequest::UpdateOne {
                filter,
                patch,
                respond_to,
            })
            .await
            .map_err(|_| StoreError::Unavailable)?;
        response.await.map_err(|_| StoreError::Dropped)?
    }
}
