//! Document trait implementation for the Order domain type.
//!
//! This module contains the [`Document`] trait implementation that lets [`Order`] be kept
//! by the generic [`doc_store::StoreActor`]. Filtering and patching are delegated to
//! [`OrderFilter::matches`] and [`OrderPatch::apply_to`].

use super::OrderError;
use crate::model::{NewOrder, Order, OrderFilter, OrderId, OrderPatch};
use doc_store::Document;

impl Document for Order {
    type Id = OrderId;
    type Create = NewOrder;
    type Filter = OrderFilter;
    type Patch = OrderPatch;
    type Error = OrderError;

    /// Builds an Order from the store-assigned id and the insertion payload.
    fn from_create_params(id: OrderId, params: NewOrder) -> Result<Self, OrderError> {
        if params.dish.trim().is_empty() {
            return Err(OrderError::MissingDish);
        }
        let (next_status, next_status_at) = match params.schedule {
            Some(schedule) => (Some(schedule.next_status), Some(schedule.next_status_at)),
            None => (None, None),
        };
        Ok(Self {
            id,
            dish: params.dish,
            status: params.status,
            created_at: params.created_at,
            status_updated_at: params.status_updated_at,
            next_status,
            next_status_at,
        })
    }

    fn id(&self) -> &OrderId {
        &self.id
    }

    fn matches(&self, filter: &OrderFilter) -> bool {
        filter.matches(self)
    }

    fn apply(&mut self, patch: OrderPatch) -> Result<(), OrderError> {
        patch.apply_to(self);
        Ok(())
    }
}
