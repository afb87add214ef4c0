use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use doc_store::{DocumentStore, StoreClient, StoreError, UpdateOutcome};
use kitchen_orders::clients::OrderClient;
use kitchen_orders::model::{
    NewOrder, Order, OrderFilter, OrderId, OrderPatch, OrderStatus, Schedule,
};
use kitchen_orders::order_store;
use kitchen_orders::policy::{LifecyclePolicy, StageDelays};
use kitchen_orders::scheduler::{PassReport, Scheduler, SchedulerConfig, SchedulerError};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn ms(n: i64) -> Duration {
    Duration::milliseconds(n)
}

fn policy(delay_ms: i64) -> LifecyclePolicy {
    LifecyclePolicy::new(StageDelays::uniform(ms(delay_ms)))
}

/// A running order store plus an order client and scheduler sharing it.
fn kitchen(
    delay_ms: i64,
    scheduling_enabled: bool,
) -> (StoreClient<Order>, OrderClient, Scheduler<StoreClient<Order>>) {
    let (actor, store) = order_store::new(32);
    tokio::spawn(actor.run());
    let client = OrderClient::new(store.clone(), policy(delay_ms), scheduling_enabled);
    let scheduler = Scheduler::new(store.clone(), policy(delay_ms), SchedulerConfig::default());
    (store, client, scheduler)
}

async fn seed_legacy(store: &StoreClient<Order>, status: OrderStatus) -> Order {
    store
        .insert(NewOrder::legacy("Soba", status, t0()))
        .await
        .expect("Failed to seed order")
}

async fn fetch(store: &StoreClient<Order>, id: OrderId) -> Order {
    store
        .get(id)
        .await
        .expect("Failed to get order")
        .expect("Order not found")
}

#[tokio::test]
async fn test_ramen_progresses_one_stage_per_due_tick() {
    let (_store, client, scheduler) = kitchen(5000, true);

    let order = client.create_order_at("Ramen", t0()).await.unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.created_at, t0());
    assert_eq!(order.status_updated_at, Some(t0()));
    assert_eq!(order.next_status, Some(OrderStatus::Preparing));
    assert_eq!(order.next_status_at, Some(t0() + ms(5000)));

    let now = t0() + ms(6000);
    let report = scheduler.tick(now).await.unwrap();
    assert_eq!(report.backfill.examined, 0);
    assert_eq!(report.advance.applied, 1);

    let order = client.get_order(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(order.status_updated_at, Some(now));
    assert_eq!(order.next_status, Some(OrderStatus::Ready));
    assert_eq!(order.next_status_at, Some(now + ms(5000)));

    scheduler.tick(t0() + ms(11000)).await.unwrap();
    let order = client.get_order(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Ready);
    assert_eq!(order.next_status, Some(OrderStatus::Served));

    scheduler.tick(t0() + ms(16000)).await.unwrap();
    let order = client.get_order(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Served);
    assert_eq!(order.status_updated_at, Some(t0() + ms(16000)));
    assert_eq!(order.next_status, None);
    assert_eq!(order.next_status_at, None);
}

#[tokio::test]
async fn test_overdue_order_catches_up_one_stage_at_a_time() {
    let (_store, client, scheduler) = kitchen(5000, true);
    let order = client.create_order_at("Ramen", t0()).await.unwrap();

    // All three delays have elapsed, but a tick only ever moves one stage.
    let late = t0() + ms(16000);
    scheduler.tick(late).await.unwrap();
    assert_eq!(client.get_order(order.id).await.unwrap().status, OrderStatus::Preparing);

    scheduler.tick(late).await.unwrap();
    assert_eq!(
        client.get_order(order.id).await.unwrap().status,
        OrderStatus::Preparing,
        "the new hop is due only one delay after the last transition"
    );

    scheduler.tick(late + ms(5000)).await.unwrap();
    assert_eq!(client.get_order(order.id).await.unwrap().status, OrderStatus::Ready);
    scheduler.tick(late + ms(10000)).await.unwrap();
    assert_eq!(client.get_order(order.id).await.unwrap().status, OrderStatus::Served);
}

#[tokio::test]
async fn test_scheduling_disabled_orders_stay_pending() {
    let (_store, client, _) = kitchen(5000, false);
    let order = client.create_order_at("Ramen", t0()).await.unwrap();

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.next_status, None);
    assert_eq!(order.next_status_at, None);

    // No scheduler runs when scheduling is disabled, so the record is never touched.
    let listed = client.list_orders().await.unwrap();
    assert_eq!(listed, vec![order]);
}

#[tokio::test]
async fn test_no_order_advances_before_it_is_due() {
    let (_store, client, scheduler) = kitchen(5000, true);
    let order = client.create_order_at("Ramen", t0()).await.unwrap();

    let report = scheduler.tick(t0() + ms(4999)).await.unwrap();

    assert!(report.is_idle());
    assert_eq!(client.get_order(order.id).await.unwrap(), order);

    // Due exactly at `nextStatusAt`.
    scheduler.tick(t0() + ms(5000)).await.unwrap();
    assert_eq!(client.get_order(order.id).await.unwrap().status, OrderStatus::Preparing);
}

#[tokio::test]
async fn test_backfill_schedules_legacy_records_idempotently() {
    let (store, _client, scheduler) = kitchen(5000, true);
    let pending = seed_legacy(&store, OrderStatus::Pending).await;
    let ready = seed_legacy(&store, OrderStatus::Ready).await;
    let served = seed_legacy(&store, OrderStatus::Served).await;

    let now = t0() + ms(1000);
    let first = scheduler.backfill(now).await.unwrap();
    assert_eq!(first.examined, 2);
    assert_eq!(first.applied, 2);

    let pending_after = fetch(&store, pending.id).await;
    assert_eq!(pending_after.status, OrderStatus::Pending);
    assert_eq!(pending_after.next_status, Some(OrderStatus::Preparing));
    assert_eq!(pending_after.next_status_at, Some(now + ms(5000)));
    assert_eq!(pending_after.status_updated_at, None);

    let ready_after = fetch(&store, ready.id).await;
    assert_eq!(ready_after.next_status, Some(OrderStatus::Served));

    // A second pass, even later, finds nothing to do and changes nothing.
    let second = scheduler.backfill(now + ms(3000)).await.unwrap();
    assert_eq!(second, PassReport::default());
    assert_eq!(fetch(&store, pending.id).await, pending_after);
    assert_eq!(fetch(&store, ready.id).await, ready_after);

    assert_eq!(fetch(&store, served.id).await, served);
}

#[tokio::test]
async fn test_zero_delay_backfill_then_advance_in_same_tick() {
    let (store, _client, scheduler) = kitchen(0, true);
    let order = seed_legacy(&store, OrderStatus::Pending).await;

    let report = scheduler.tick(t0()).await.unwrap();

    // The passes run in order: the schedule written by backfill is already due.
    assert_eq!(report.backfill.applied, 1);
    assert_eq!(report.advance.applied, 1);
    let order = fetch(&store, order.id).await;
    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(order.next_status, Some(OrderStatus::Ready));
}

#[tokio::test]
async fn test_served_orders_are_never_modified() {
    let (_store, client, scheduler) = kitchen(1000, true);
    let order = client.create_order_at("Ramen", t0()).await.unwrap();
    for step in 1..=3 {
        scheduler.tick(t0() + ms(1000 * step)).await.unwrap();
    }
    let served = client.get_order(order.id).await.unwrap();
    assert_eq!(served.status, OrderStatus::Served);

    for step in 4..=10 {
        let report = scheduler.tick(t0() + ms(1000 * step)).await.unwrap();
        assert!(report.is_idle());
    }
    assert_eq!(client.get_order(order.id).await.unwrap(), served);
}

#[tokio::test]
async fn test_status_never_regresses_or_skips() {
    let (_store, client, scheduler) = kitchen(700, true);
    let mut ids = Vec::new();
    for (i, dish) in ["Ramen", "Gyoza", "Mochi", "Tempura"].into_iter().enumerate() {
        let placed_at = t0() + ms(300 * i as i64);
        ids.push(client.create_order_at(dish, placed_at).await.unwrap().id);
    }

    let mut last_rank = vec![0usize; ids.len()];
    for step in 0..40 {
        scheduler.tick(t0() + ms(250 * step)).await.unwrap();
        for (i, id) in ids.iter().enumerate() {
            let order = client.get_order(*id).await.unwrap();
            let rank = order.status.rank();
            assert!(rank >= last_rank[i], "{} regressed", id);
            assert!(rank <= last_rank[i] + 1, "{} skipped a stage", id);
            assert_eq!(order.next_status.is_some(), order.next_status_at.is_some());
            last_rank[i] = rank;
        }
    }
    assert!(last_rank.iter().all(|r| *r == OrderStatus::Served.rank()));
}

#[tokio::test]
async fn test_passes_respect_batch_size() {
    let (store, _client, _) = kitchen(5000, true);
    let config = SchedulerConfig {
        batch_size: 3,
        ..SchedulerConfig::default()
    };
    let scheduler = Scheduler::new(store.clone(), policy(5000), config);
    for _ in 0..7 {
        seed_legacy(&store, OrderStatus::Pending).await;
    }

    let mut counts = Vec::new();
    for _ in 0..4 {
        counts.push(scheduler.backfill(t0()).await.unwrap().applied);
    }

    assert_eq!(counts, vec![3, 3, 1, 0]);
}

#[tokio::test]
async fn test_concurrent_ticks_apply_each_transition_once() {
    let (store, client, _) = kitchen(5000, true);
    let mut ids = Vec::new();
    for _ in 0..10 {
        ids.push(client.create_order_at("Ramen", t0()).await.unwrap().id);
    }

    let a = Scheduler::new(store.clone(), policy(5000), SchedulerConfig::default());
    let b = Scheduler::new(store.clone(), policy(5000), SchedulerConfig::default());
    let now = t0() + ms(6000);
    let (ra, rb) = tokio::join!(a.tick(now), b.tick(now));
    let (ra, rb) = (ra.unwrap(), rb.unwrap());

    assert_eq!(ra.advance.applied + rb.advance.applied, 10);
    assert_eq!(ra.advance.failed + rb.advance.failed, 0);
    for id in ids {
        let order = fetch(&store, id).await;
        assert_eq!(order.status, OrderStatus::Preparing);
        assert_eq!(order.next_status_at, Some(now + ms(5000)));
    }
}

/// Lets a competing writer advance an order between the scheduler's read and its write.
struct RacingStore {
    inner: StoreClient<Order>,
    rival: Scheduler<StoreClient<Order>>,
    now: DateTime<Utc>,
}

#[async_trait]
impl DocumentStore<Order> for RacingStore {
    async fn insert(&self, params: NewOrder) -> Result<Order, StoreError> {
        self.inner.insert(params).await
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.inner.get(id).await
    }

    async fn find(&self, filter: OrderFilter, limit: Option<usize>) -> Result<Vec<Order>, StoreError> {
        let batch = self.inner.find(filter, limit).await?;
        self.rival
            .advance_due(self.now)
            .await
            .map_err(|e| StoreError::Unexpected(e.to_string()))?;
        Ok(batch)
    }

    async fn update_one(&self, filter: OrderFilter, patch: OrderPatch) -> Result<UpdateOutcome, StoreError> {
        self.inner.update_one(filter, patch).await
    }
}

#[tokio::test]
async fn test_lost_race_is_skipped_and_state_matches_winner() {
    let (store, client, _) = kitchen(5000, true);
    let order = client.create_order_at("Ramen", t0()).await.unwrap();
    let now = t0() + ms(6000);

    let racing = RacingStore {
        inner: store.clone(),
        rival: Scheduler::new(store.clone(), policy(5000), SchedulerConfig::default()),
        now,
    };
    let loser = Scheduler::new(racing, policy(5000), SchedulerConfig::default());

    let report = loser.advance_due(now).await.unwrap();

    assert_eq!(report.examined, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.applied, 0);
    let order = fetch(&store, order.id).await;
    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(order.next_status, Some(OrderStatus::Ready));
    assert_eq!(order.next_status_at, Some(now + ms(5000)));
}

#[tokio::test]
async fn test_store_outage_aborts_tick() {
    let (actor, store) = order_store::new(8);
    let actor_handle = tokio::spawn(actor.run());
    let scheduler = Scheduler::new(store.clone(), policy(5000), SchedulerConfig::default());
    seed_legacy(&store, OrderStatus::Pending).await;

    actor_handle.abort();
    let _ = actor_handle.await;

    assert!(!store.is_connected());
    let result = scheduler.tick(t0() + ms(6000)).await;
    assert!(matches!(result, Err(SchedulerError::Store(StoreError::Unavailable))));
}

#[tokio::test]
async fn test_malformed_due_records_do_not_starve_valid_orders() {
    let (store, client, _) = kitchen(5000, true);
    let config = SchedulerConfig {
        batch_size: 3,
        ..SchedulerConfig::default()
    };
    let scheduler = Scheduler::new(store.clone(), policy(5000), config);

    // `pending` records that claim to jump straight to `ready`, and a served one
    // that still carries a schedule.
    let stale = Schedule {
        next_status: OrderStatus::Ready,
        next_status_at: t0(),
    };
    let mut malformed = Vec::new();
    for status in [OrderStatus::Pending, OrderStatus::Pending, OrderStatus::Pending, OrderStatus::Served] {
        let mut new_order = NewOrder::legacy("Soba", status, t0());
        new_order.schedule = Some(stale);
        malformed.push(store.insert(new_order).await.unwrap().id);
    }
    let valid = client.create_order_at("Ramen", t0()).await.unwrap();

    let now = t0() + ms(6000);
    let first = scheduler.tick(now).await.unwrap();
    assert_eq!(first.advance.repaired, 3);
    let second = scheduler.tick(now).await.unwrap();
    assert_eq!(second.advance.repaired, 1);
    assert_eq!(second.advance.applied, 1);

    assert_eq!(fetch(&store, valid.id).await.status, OrderStatus::Preparing);
    for id in &malformed[..3] {
        let order = fetch(&store, *id).await;
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.next_status, Some(OrderStatus::Preparing));
        assert_eq!(order.next_status_at, Some(now + ms(5000)));
    }
    let served = fetch(&store, malformed[3]).await;
    assert_eq!(served.status, OrderStatus::Served);
    assert_eq!(served.schedule(), None);
    assert_eq!(served.next_status, None);

    // Nothing is due any more until the fresh schedules come up.
    assert!(scheduler.tick(now).await.unwrap().is_idle());
}
