//! # Scheduler (Background Worker)
//!
//! The scheduler moves orders along their lifecycle without any client interaction. It
//! is a single periodic task that, on every tick, runs two strictly sequential passes
//! against the order store:
//!
//! 1. **Backfill**: orders in a non-terminal status whose `nextStatus` or `nextStatusAt`
//!    is missing get a fresh schedule from the [`LifecyclePolicy`](crate::policy::LifecyclePolicy).
//! 2. **Advancement**: orders whose `nextStatusAt` has passed move to `nextStatus` and
//!    receive the schedule for the following stage, or have it cleared on reaching
//!    `served`.
//!
//! Each pass reads a bounded batch (`batch_size`) and writes every record with a
//! conditional update pinned to the fields it observed. There is no lock anywhere in this
//! module: if two ticks (in this process or another sharing the store) race for one
//! record, the store lets exactly one write through and the other sees
//! [`UpdateOutcome::NotMatched`](doc_store::UpdateOutcome::NotMatched), which is counted
//! as skipped and never retried within the tick.
//!
//! A record advances at most one stage per tick. An order that fell several delays
//! behind catches up over consecutive ticks.
//!
//! ## Failures
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Batch query fails | Tick aborts with [`SchedulerError::Store`]; next tick starts over |
//! | Single update fails | Logged, counted in [`PassReport::failed`], batch continues |
//! | Lost race | Counted in [`PassReport::skipped`] at debug level |
//! | Due schedule contradicts the policy | Logged, status kept, schedule rewritten from the status ([`PassReport::repaired`]) |
//!
//! Nothing here is fatal to the process.

mod passes;
mod worker;

pub use passes::{PassReport, TickReport};
pub use worker::{Scheduler, SchedulerHandle};

use doc_store::StoreError;
use std::time::Duration;
use thiserror::Error;

/// Tick cadence and batch bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Raised to [`MIN_TICK_INTERVAL`] when shorter.
    pub tick_interval: Duration,
    pub batch_size: usize,
}

/// Shortest period the loop will tick at.
pub const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

impl SchedulerConfig {
    /// The period the loop actually uses.
    pub fn period(&self) -> Duration {
        self.tick_interval.max(MIN_TICK_INTERVAL)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
            batch_size: 25,
        }
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Store query failed: {0}")]
    Store(#[from] StoreError),
}
