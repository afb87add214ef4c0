//! # Order Client
//!
//! The order service boundary: places orders and reads them back. It never changes an
//! order after creation; from then on the [`Scheduler`](crate::scheduler::Scheduler) is
//! the only writer of `status` and the schedule fields.
use crate::model::{NewOrder, Order, OrderFilter, OrderId, OrderStatus};
use crate::order_store::OrderError;
use crate::policy::LifecyclePolicy;
use chrono::{DateTime, Utc};
use doc_store::{DocumentStore, StoreClient};
use tracing::{debug, info, instrument};

/// Client for placing and reading orders.
///
/// With scheduling enabled, creation assigns the same schedule the backfill pass would,
/// so the scheduler never has to touch a fresh order's first hop.
#[derive(Clone)]
pub struct OrderClient<S = StoreClient<Order>> {
    store: S,
    policy: LifecyclePolicy,
    scheduling_enabled: bool,
}

impl<S: DocumentStore<Order>> OrderClient<S> {
    pub fn new(store: S, policy: LifecyclePolicy, scheduling_enabled: bool) -> Self {
        Self {
            store,
            policy,
            scheduling_enabled,
        }
    }

    pub fn scheduling_enabled(&self) -> bool {
        self.scheduling_enabled
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_connected()
    }

    /// Places an order for `dish` as of now.
    pub async fn create_order(&self, dish: &str) -> Result<Order, OrderError> {
        self.create_order_at(dish, Utc::now()).await
    }

    /// Places an order for `dish` as of `now`.
    #[instrument(skip(self))]
    pub async fn create_order_at(&self, dish: &str, now: DateTime<Utc>) -> Result<Order, OrderError> {
        if dish.trim().is_empty() {
            return Err(OrderError::MissingDish);
        }

        let schedule = if self.scheduling_enabled {
            self.policy.schedule_from(OrderStatus::Pending, now)
        } else {
            None
        };
        debug!(?schedule, "Sending create_order to store");

        let order = self.store.insert(NewOrder::placed(dish, now, schedule)).await?;
        info!(order_id = %order.id, "Order placed");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        self.store.get(id).await?.ok_or(OrderError::NotFound(id))
    }

    /// Every order, in id order.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        Ok(self.store.find(OrderFilter::all(), None).await?)
    }
}
