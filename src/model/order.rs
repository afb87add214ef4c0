//! Represents a kitchen order and the types used to query and patch it.
//!
//! # Store Document
//! [`Order`] implements the [`Document`](doc_store::Document) trait (see
//! [`crate::order_store`]), so it can be kept by a [`StoreActor`](doc_store::StoreActor).
//! [`OrderFilter`] and [`OrderPatch`] are its predicate and mutation types.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Type-safe identifier for Orders, assigned by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u32);

impl From<u32> for OrderId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// One stage of the fixed chain `pending → preparing → ready → served`.
///
/// The variants are declared in chain order; which stage follows which is decided by
/// [`LifecyclePolicy`](crate::policy::LifecyclePolicy), not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Preparing,
    Ready,
    Served,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
    ];

    /// Position in the chain, starting at 0 for `pending`.
    pub fn rank(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// The next due transition of an order: `nextStatus` and `nextStatusAt` as one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub next_status: OrderStatus,
    pub next_status_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub dish: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_status_at: Option<DateTime<Utc>>,
}

impl Order {
    /// The pending transition, if both halves of it are present.
    pub fn schedule(&self) -> Option<Schedule> {
        match (self.next_status, self.next_status_at) {
            (Some(next_status), Some(next_status_at)) => Some(Schedule {
                next_status,
                next_status_at,
            }),
            _ => None,
        }
    }

    /// True when `nextStatus` or `nextStatusAt` is missing.
    pub fn schedule_incomplete(&self) -> bool {
        self.next_status.is_none() || self.next_status_at.is_none()
    }
}

/// Payload for inserting a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub dish: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub schedule: Option<Schedule>,
}

impl NewOrder {
    /// A freshly placed order: `pending`, with `statusUpdatedAt = createdAt = now`.
    pub fn placed(dish: impl Into<String>, now: DateTime<Utc>, schedule: Option<Schedule>) -> Self {
        Self {
            dish: dish.into(),
            status: OrderStatus::Pending,
            created_at: now,
            status_updated_at: Some(now),
            schedule,
        }
    }

    /// A record as written before scheduling existed: no `statusUpdatedAt`, no schedule.
    pub fn legacy(dish: impl Into<String>, status: OrderStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            dish: dish.into(),
            status,
            created_at,
            status_updated_at: None,
            schedule: None,
        }
    }
}

/// Predicate on a single optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldMatch<T> {
    #[default]
    Any,
    Absent,
    Present,
    Equals(T),
    AtOrBefore(T),
}

impl<T: PartialOrd> FieldMatch<T> {
    pub fn test(&self, value: Option<&T>) -> bool {
        match (self, value) {
            (FieldMatch::Any, _) => true,
            (FieldMatch::Absent, value) => value.is_none(),
            (FieldMatch::Present, value) => value.is_some(),
            (FieldMatch::Equals(expected), Some(value)) => value == expected,
            (FieldMatch::AtOrBefore(bound), Some(value)) => value <= bound,
            (FieldMatch::Equals(_) | FieldMatch::AtOrBefore(_), None) => false,
        }
    }
}

/// Conjunction of predicates over an order. The default matches every order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub id: Option<OrderId>,
    pub statuses: Option<Vec<OrderStatus>>,
    pub next_status: FieldMatch<OrderStatus>,
    pub next_status_at: FieldMatch<DateTime<Utc>>,
    /// `nextStatus` absent OR `nextStatusAt` absent.
    pub schedule_incomplete: bool,
}

impl OrderFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: OrderId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Orders in one of `statuses` that lack a complete schedule.
    pub fn unscheduled(statuses: Vec<OrderStatus>) -> Self {
        Self {
            statuses: Some(statuses),
            schedule_incomplete: true,
            ..Self::default()
        }
    }

    /// Orders with a `nextStatus` whose `nextStatusAt` is at or before `now`.
    pub fn due(now: DateTime<Utc>) -> Self {
        Self {
            next_status: FieldMatch::Present,
            next_status_at: FieldMatch::AtOrBefore(now),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.statuses = Some(vec![status]);
        self
    }

    pub fn with_next_status(mut self, next_status: Option<OrderStatus>) -> Self {
        self.next_status = match next_status {
            Some(status) => FieldMatch::Equals(status),
            None => FieldMatch::Absent,
        };
        self
    }

    pub fn with_next_status_at(mut self, next_status_at: Option<DateTime<Utc>>) -> Self {
        self.next_status_at = match next_status_at {
            Some(at) => FieldMatch::Equals(at),
            None => FieldMatch::Absent,
        };
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.id.map_or(true, |id| id == order.id)
            && self
                .statuses
                .as_ref()
                .map_or(true, |statuses| statuses.contains(&order.status))
            && self.next_status.test(order.next_status.as_ref())
            && self.next_status_at.test(order.next_status_at.as_ref())
            && (!self.schedule_incomplete || order.schedule_incomplete())
    }
}

/// What to do with the `nextStatus`/`nextStatusAt` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum ScheduleChange {
    #[default]
    Keep,
    Set(Schedule),
    /// Unset both fields.
    Clear,
}

/// Fields to set or unset on one order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub status_updated_at: Option<DateTime<Utc>>,
    pub schedule: ScheduleChange,
}

impl OrderPatch {
    /// Sets a schedule and nothing else.
    pub fn schedule(schedule: Schedule) -> Self {
        Self {
            schedule: ScheduleChange::Set(schedule),
            ..Self::default()
        }
    }

    /// Moves to `status` at `at`, then either sets the following schedule or clears it.
    pub fn transition(status: OrderStatus, at: DateTime<Utc>, following: Option<Schedule>) -> Self {
        Self {
            status: Some(status),
            status_updated_at: Some(at),
            schedule: following.map_or(ScheduleChange::Clear, ScheduleChange::Set),
        }
    }

    pub fn apply_to(self, order: &mut Order) {
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(at) = self.status_updated_at {
            order.status_updated_at = Some(at);
        }
        match self.schedule {
            ScheduleChange::Keep => {}
            ScheduleChange::Set(schedule) => {
                order.next_status = Some(schedule.next_status);
                order.next_status_at = Some(schedule.next_status_at);
            }
            ScheduleChange::Clear => {
                order.next_status = None;
                order.next_status_at = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn order(status: OrderStatus, schedule: Option<(OrderStatus, DateTime<Utc>)>) -> Order {
        Order {
            id: OrderId(1),
            dish: "Ramen".into(),
            status,
            created_at: t0(),
            status_updated_at: Some(t0()),
            next_status: schedule.map(|(s, _)| s),
            next_status_at: schedule.map(|(_, at)| at),
        }
    }

    #[test]
    fn test_status_names_round_trip_through_from_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>(), Ok(status));
        }
        assert_eq!(
            "burnt".parse::<OrderStatus>(),
            Err(UnknownStatus("burnt".into()))
        );
    }

    #[test]
    fn test_due_filter_is_inclusive_and_requires_next_status() {
        let at = t0() + Duration::seconds(5);
        let scheduled = order(OrderStatus::Pending, Some((OrderStatus::Preparing, at)));

        assert!(!OrderFilter::due(at - Duration::milliseconds(1)).matches(&scheduled));
        assert!(OrderFilter::due(at).matches(&scheduled));

        let mut half = scheduled.clone();
        half.next_status = None;
        assert!(!OrderFilter::due(at).matches(&half));
    }

    #[test]
    fn test_unscheduled_filter_catches_half_schedules() {
        let statuses = vec![OrderStatus::Pending, OrderStatus::Preparing, OrderStatus::Ready];
        let filter = OrderFilter::unscheduled(statuses);

        assert!(filter.matches(&order(OrderStatus::Pending, None)));

        let mut half = order(OrderStatus::Ready, None);
        half.next_status_at = Some(t0());
        assert!(filter.matches(&half));

        let full = order(OrderStatus::Pending, Some((OrderStatus::Preparing, t0())));
        assert!(!filter.matches(&full));
        assert!(!filter.matches(&order(OrderStatus::Served, None)));
    }

    #[test]
    fn test_guard_filter_pins_observed_fields() {
        let at = t0() + Duration::seconds(5);
        let current = order(OrderStatus::Pending, Some((OrderStatus::Preparing, at)));
        let guard = OrderFilter::by_id(OrderId(1))
            .with_status(OrderStatus::Pending)
            .with_next_status(Some(OrderStatus::Preparing))
            .with_next_status_at(Some(at));
        assert!(guard.matches(&current));

        let mut moved = current.clone();
        OrderPatch::transition(OrderStatus::Preparing, at, None).apply_to(&mut moved);
        assert!(!guard.matches(&moved));
        assert!(!OrderFilter::by_id(OrderId(2)).matches(&current));
    }

    #[test]
    fn test_transition_patch_clears_schedule_when_no_following_stage() {
        let at = t0() + Duration::seconds(15);
        let mut ready = order(OrderStatus::Ready, Some((OrderStatus::Served, at)));

        OrderPatch::transition(OrderStatus::Served, at, None).apply_to(&mut ready);

        assert_eq!(ready.status, OrderStatus::Served);
        assert_eq!(ready.status_updated_at, Some(at));
        assert_eq!(ready.next_status, None);
        assert_eq!(ready.next_status_at, None);
    }

    #[test]
    fn test_order_json_uses_camel_case_and_omits_absent_schedule() {
        let served = order(OrderStatus::Served, None);
        let json = serde_json::to_value(&served).unwrap();

        assert_eq!(json["_id"], 1);
        assert_eq!(json["status"], "served");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("nextStatus").is_none());
        assert!(json.get("nextStatusAt").is_none());

        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, served);
    }
}
