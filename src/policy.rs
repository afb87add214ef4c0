//! # Lifecycle Policy
//!
//! The single source of truth for how an order progresses: a pure mapping from the current
//! status to the next status and the delay before moving there.
//!
//! | From | To | Delay |
//! |------|----|-------|
//! | `pending` | `preparing` | `StageDelays::pending` |
//! | `preparing` | `ready` | `StageDelays::preparing` |
//! | `ready` | `served` | `StageDelays::ready` |
//! | `served` | none | terminal |
//!
//! `advance` returning `None` means "no further transition", not failure. Callers branch
//! on it explicitly.

use crate::model::{OrderStatus, Schedule};
use chrono::{DateTime, Duration, Utc};

/// How long an order waits in each non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageDelays {
    pub pending: Duration,
    pub preparing: Duration,
    pub ready: Duration,
}

impl StageDelays {
    pub fn uniform(delay: Duration) -> Self {
        Self {
            pending: delay,
            preparing: delay,
            ready: delay,
        }
    }
}

impl Default for StageDelays {
    fn default() -> Self {
        Self::uniform(Duration::milliseconds(5000))
    }
}

/// One edge of the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: OrderStatus,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecyclePolicy {
    delays: StageDelays,
}

impl LifecyclePolicy {
    pub fn new(delays: StageDelays) -> Self {
        Self { delays }
    }

    pub fn delays(&self) -> StageDelays {
        self.delays
    }

    /// The transition out of `status`, or `None` if `status` is terminal.
    pub fn advance(&self, status: OrderStatus) -> Option<Transition> {
        let (next, delay) = match status {
            OrderStatus::Pending => (OrderStatus::Preparing, self.delays.pending),
            OrderStatus::Preparing => (OrderStatus::Ready, self.delays.preparing),
            OrderStatus::Ready => (OrderStatus::Served, self.delays.ready),
            OrderStatus::Served => return None,
        };
        Some(Transition { next, delay })
    }

    /// The schedule an order in `status` should carry as of `now`.
    ///
    /// The due time saturates at the latest representable instant rather than overflowing.
    pub fn schedule_from(&self, status: OrderStatus, now: DateTime<Utc>) -> Option<Schedule> {
        let transition = self.advance(status)?;
        Some(Schedule {
            next_status: transition.next,
            next_status_at: now
                .checked_add_signed(transition.delay)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        })
    }

    /// Every status `advance` is defined for.
    pub fn non_terminal(&self) -> Vec<OrderStatus> {
        OrderStatus::ALL
            .into_iter()
            .filter(|status| self.advance(*status).is_some())
            .collect()
    }
}
