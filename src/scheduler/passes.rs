use super::{Scheduler, SchedulerError};
use crate::model::{Order, OrderFilter, OrderPatch, ScheduleChange};
use chrono::{DateTime, Utc};
use doc_store::{DocumentStore, UpdateOutcome};
use tracing::{debug, error, info, warn};

/// What one pass did with its batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    pub examined: usize,
    pub applied: usize,
    /// Lost races and records that were not eligible after all.
    pub skipped: usize,
    /// Due records whose schedule contradicted the policy and was rewritten in place.
    pub repaired: usize,
    pub failed: usize,
}

impl PassReport {
    fn record(&mut self, outcome: Result<UpdateOutcome, doc_store::StoreError>, order: &Order) {
        match outcome {
            Ok(UpdateOutcome::Applied) => self.applied += 1,
            Ok(UpdateOutcome::NotMatched) => {
                debug!(order_id = %order.id, "Record changed since read, skipping");
                self.skipped += 1;
            }
            Err(e) => {
                warn!(order_id = %order.id, error = %e, "Update failed");
                self.failed += 1;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub backfill: PassReport,
    pub advance: PassReport,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.backfill.examined == 0 && self.advance.examined == 0
    }
}

impl<S: DocumentStore<Order>> Scheduler<S> {
    /// Runs one tick: the backfill pass, then the advancement pass.
    ///
    /// A failed batch query aborts the tick. Records already written stay written; the
    /// rest are picked up again by the next tick.
    pub async fn tick(&self, now: DateTime<Utc>) -> Result<TickReport, SchedulerError> {
        let backfill = match self.backfill(now).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Backfill pass aborted");
                return Err(e);
            }
        };
        let advance = match self.advance_due(now).await {
            Ok(report) => report,
            Err(e) => {
                error!(error = %e, "Advancement pass aborted");
                return Err(e);
            }
        };

        let report = TickReport { backfill, advance };
        if report.is_idle() {
            debug!("Nothing to do");
        } else {
            info!(
                backfilled = backfill.applied,
                advanced = advance.applied,
                skipped = backfill.skipped + advance.skipped,
                repaired = advance.repaired,
                failed = backfill.failed + advance.failed,
                "Tick complete"
            );
        }
        Ok(report)
    }

    /// Assigns a schedule to non-terminal orders that lack one.
    ///
    /// The write is guarded by id, status and the absence of `nextStatus`, so it never
    /// clobbers an order that was scheduled or advanced after it was read. An order
    /// carrying a `nextStatus` without `nextStatusAt` is guarded on that observed
    /// `nextStatus` instead and gets a schedule consistent with its status.
    pub async fn backfill(&self, now: DateTime<Utc>) -> Result<PassReport, SchedulerError> {
        let filter = OrderFilter::unscheduled(self.policy().non_terminal());
        let batch = self
            .store()
            .find(filter, Some(self.config().batch_size))
            .await?;

        let mut report = PassReport::default();
        for order in batch {
            report.examined += 1;
            let Some(schedule) = self.policy().schedule_from(order.status, now) else {
                warn!(order_id = %order.id, status = %order.status, "Terminal order in backfill batch");
                report.skipped += 1;
                continue;
            };

            let mut guard = OrderFilter::by_id(order.id)
                .with_status(order.status)
                .with_next_status(order.next_status);
            if order.next_status.is_some() {
                guard = guard.with_next_status_at(None);
            }

            let outcome = self
                .store()
                .update_one(guard, OrderPatch::schedule(schedule))
                .await;
            if matches!(outcome, Ok(UpdateOutcome::Applied)) {
                info!(
                    order_id = %order.id,
                    status = %order.status,
                    next_status = %schedule.next_status,
                    next_status_at = %schedule.next_status_at,
                    "Backfilled schedule"
                );
            }
            report.record(outcome, &order);
        }
        Ok(report)
    }

    /// Moves every due order one stage forward.
    ///
    /// The write is guarded by id, status, `nextStatus` and `nextStatusAt` exactly as
    /// read, so of several concurrent ticks only one can apply a given transition.
    ///
    /// A due order whose `nextStatus` is not the policy's next stage keeps its status and
    /// gets the schedule its status calls for (or none, if terminal). Left as it was, it
    /// would stay due and come back in every batch.
    pub async fn advance_due(&self, now: DateTime<Utc>) -> Result<PassReport, SchedulerError> {
        let batch = self
            .store()
            .find(OrderFilter::due(now), Some(self.config().batch_size))
            .await?;

        let mut report = PassReport::default();
        for order in batch {
            report.examined += 1;
            let Some(schedule) = order.schedule() else {
                warn!(order_id = %order.id, "Due order without a complete schedule");
                report.skipped += 1;
                continue;
            };

            let guard = OrderFilter::by_id(order.id)
                .with_status(order.status)
                .with_next_status(Some(schedule.next_status))
                .with_next_status_at(Some(schedule.next_status_at));

            let expected = self.policy().advance(order.status).map(|t| t.next);
            if expected != Some(schedule.next_status) {
                warn!(
                    order_id = %order.id,
                    status = %order.status,
                    next_status = %schedule.next_status,
                    "Schedule does not follow the lifecycle, rescheduling"
                );
                let repair = match self.policy().schedule_from(order.status, now) {
                    Some(fresh) => ScheduleChange::Set(fresh),
                    None => ScheduleChange::Clear,
                };
                let patch = OrderPatch {
                    schedule: repair,
                    ..OrderPatch::default()
                };
                match self.store().update_one(guard, patch).await {
                    Ok(UpdateOutcome::Applied) => report.repaired += 1,
                    outcome => report.record(outcome, &order),
                }
                continue;
            }

            // `None` here means the order is entering the terminal stage.
            let following = self.policy().schedule_from(schedule.next_status, now);
            let patch = OrderPatch::transition(schedule.next_status, now, following);

            let outcome = self.store().update_one(guard, patch).await;
            if matches!(outcome, Ok(UpdateOutcome::Applied)) {
                info!(
                    order_id = %order.id,
                    from = %order.status,
                    to = %schedule.next_status,
                    terminal = following.is_none(),
                    "Order advanced"
                );
            }
            report.record(outcome, &order);
        }
        Ok(report)
    }
}
