use crate::clients::OrderClient;
use crate::config::{ConfigError, KitchenConfig};
use crate::model::Order;
use crate::order_store;
use crate::scheduler::{Scheduler, SchedulerHandle};
use doc_store::StoreClient;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Store connectivity as reported by [`OrderSystem::health`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Connected,
    Disconnected,
}

/// Scheduler state as reported by [`OrderSystem::health`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerStatus {
    Running,
    Stopped,
    Disabled,
}

/// Liveness summary, serialized as `{"status":"ok","store":...,"scheduler":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub store: StoreStatus,
    pub scheduler: SchedulerStatus,
}

/// The running order tracking system.
pub struct OrderSystem {
    /// Client for placing and reading orders.
    pub order_client: OrderClient,

    scheduling_enabled: bool,
    scheduler: Option<Arc<Scheduler<StoreClient<Order>>>>,
    scheduler_handle: Option<SchedulerHandle>,
    store_handle: JoinHandle<()>,
}

impl OrderSystem {
    /// Validates `config`, spawns the store actor and, if enabled, starts the scheduler.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(config: KitchenConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (store_actor, store_client) = order_store::new(config.store.buffer_size);
        let store_handle = tokio::spawn(store_actor.run());

        let scheduling = &config.scheduling;
        let policy = scheduling.policy();
        let order_client = OrderClient::new(store_client.clone(), policy, scheduling.enabled);

        let (scheduler, scheduler_handle) = if !scheduling.enabled {
            info!("Scheduling disabled, orders stay at their creation status");
            (None, None)
        } else if !store_client.is_connected() {
            warn!("Store not connected, scheduler not started");
            (None, None)
        } else {
            let scheduler = Arc::new(Scheduler::new(store_client, policy, scheduling.scheduler()));
            let handle = scheduler.start();
            (Some(scheduler), handle)
        };

        info!(
            scheduling_enabled = scheduling.enabled,
            pending_ms = scheduling.delays.pending_ms,
            preparing_ms = scheduling.delays.preparing_ms,
            ready_ms = scheduling.delays.ready_ms,
            "Order system started"
        );

        Ok(Self {
            order_client,
            scheduling_enabled: scheduling.enabled,
            scheduler,
            scheduler_handle,
            store_handle,
        })
    }

    pub fn health(&self) -> HealthReport {
        let store = if self.order_client.is_connected() {
            StoreStatus::Connected
        } else {
            StoreStatus::Disconnected
        };
        let scheduler = match &self.scheduler {
            _ if !self.scheduling_enabled => SchedulerStatus::Disabled,
            Some(scheduler) if scheduler.is_running() => SchedulerStatus::Running,
            _ => SchedulerStatus::Stopped,
        };

        HealthReport {
            status: "ok",
            store,
            scheduler,
        }
    }

    /// Stops the scheduler, closes the store and waits for both tasks.
    ///
    /// Returns an error if either task panicked.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down order system...");

        if let Some(handle) = self.scheduler_handle {
            if let Err(e) = handle.stop().await {
                error!("Scheduler task failed: {:?}", e);
                return Err(format!("Scheduler task failed: {:?}", e));
            }
        }

        // The scheduler holds a store client; it must go before the store can close.
        drop(self.scheduler);
        drop(self.order_client);

        if let Err(e) = self.store_handle.await {
            error!("Store task failed: {:?}", e);
            return Err(format!("Store task failed: {:?}", e));
        }

        info!("Order system shutdown complete.");
        Ok(())
    }
}
