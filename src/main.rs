//! Demo: places a few orders and watches them move through the kitchen.
//!
//! ```bash
//! RUST_LOG=info KITCHEN_STAGE_DELAY_MS=1000 KITCHEN_TICK_INTERVAL_MS=250 cargo run
//! ```

use kitchen_orders::config::KitchenConfig;
use kitchen_orders::model::{Order, OrderStatus};
use kitchen_orders::runtime::{setup_tracing, OrderSystem};
use std::time::Duration;
use tracing::{error, info, Instrument};

const DISHES: [&str; 3] = ["Ramen", "Gyoza", "Matcha Ice Cream"];

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = KitchenConfig::from_env().map_err(|e| e.to_string())?;
    let poll_every = Duration::from_millis(config.scheduling.tick_interval_ms);
    let system = OrderSystem::start(config).map_err(|e| e.to_string())?;

    let span = tracing::info_span!("placing_orders");
    async {
        for dish in DISHES {
            match system.order_client.create_order(dish).await {
                Ok(order) => info!(order_id = %order.id, dish = %order.dish, "Order placed"),
                Err(e) => error!(dish, error = %e, "Order rejected"),
            }
        }
    }
    .instrument(span)
    .await;

    if system.order_client.scheduling_enabled() {
        loop {
            let orders = system
                .order_client
                .list_orders()
                .await
                .map_err(|e| e.to_string())?;
            info!(board = %board(&orders), "Order board");
            if orders.iter().all(|o| o.status == OrderStatus::Served) {
                break;
            }
            tokio::time::sleep(poll_every).await;
        }
    } else {
        info!("Scheduling disabled, orders will stay pending");
    }

    let health = serde_json::to_string(&system.health()).map_err(|e| e.to_string())?;
    println!("{health}");

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}

fn board(orders: &[Order]) -> String {
    orders
        .iter()
        .map(|o| format!("{}={}", o.id, o.status))
        .collect::<Vec<_>>()
        .join(" ")
}
