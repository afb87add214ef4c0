use super::SchedulerConfig;
use crate::model::Order;
use crate::policy::LifecyclePolicy;
use chrono::Utc;
use doc_store::DocumentStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, Instrument};

/// The background worker that advances orders over time.
///
/// A `Scheduler` is constructed once and started once. The start state lives on the
/// instance, so a second [`start`](Scheduler::start) is a no-op rather than a second loop.
///
/// ```rust,ignore
/// let scheduler = Arc::new(Scheduler::new(store, policy, SchedulerConfig::default()));
/// let handle = scheduler.start().expect("first start");
/// assert!(scheduler.start().is_none());
/// // ...
/// handle.stop().await?;
/// ```
pub struct Scheduler<S> {
    store: S,
    policy: LifecyclePolicy,
    config: SchedulerConfig,
    started: AtomicBool,
    running: AtomicBool,
}

/// Owner of a started scheduler loop.
///
/// Holds the sending half of the loop's stop signal. Dropping the handle drops the
/// sender, which also ends the loop; the task never keeps the runtime from shutting down.
pub struct SchedulerHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Signals the loop to stop and waits for it. A tick in progress finishes first.
    pub async fn stop(self) -> Result<(), JoinError> {
        let _ = self.stop.send(());
        self.task.await
    }
}

impl<S> Scheduler<S> {
    pub fn new(store: S, policy: LifecyclePolicy, config: SchedulerConfig) -> Self {
        Self {
            store,
            policy,
            config,
            started: AtomicBool::new(false),
            running: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn policy(&self) -> &LifecyclePolicy {
        &self.policy
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// True between a successful `start` and the end of the loop.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl<S: DocumentStore<Order> + 'static> Scheduler<S> {
    /// Spawns the periodic loop. Returns `None` if this scheduler was started before.
    pub fn start(self: &Arc<Self>) -> Option<SchedulerHandle> {
        if self
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Scheduler already started");
            return None;
        }

        let (stop, stop_rx) = oneshot::channel();
        self.running.store(true, Ordering::Release);
        let task = tokio::spawn(Arc::clone(self).run(stop_rx));
        Some(SchedulerHandle { stop, task })
    }

    async fn run(self: Arc<Self>, mut stop: oneshot::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.config.period());
        // A slow tick pushes the next one back instead of firing a burst to catch up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            tick_interval_ms = self.config.period().as_millis() as u64,
            batch_size = self.config.batch_size,
            "Scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                // Fires on an explicit stop and when the handle is dropped.
                _ = &mut stop => break,
                _ = ticker.tick() => {
                    let now = Utc::now();
                    let span = tracing::info_span!("scheduler_tick", %now);
                    // Failures are logged inside `tick`; the next tick retries.
                    let _ = self.tick(now).instrument(span).await;
                }
            }
        }

        self.running.store(false, Ordering::Release);
        info!("Scheduler stopped");
    }
}
