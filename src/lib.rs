//! # Kitchen Orders
//!
//! > **Orders that move through the kitchen on their own.**
//!
//! Every order walks a fixed lifecycle, `pending → preparing → ready → served`, with a
//! configurable delay per stage. Nothing but a background [`scheduler`] moves an order
//! forward: it periodically assigns missing schedules, then advances every order whose
//! `nextStatusAt` has passed.
//!
//! ## Module Tour
//!
//! ### 1. The Store ([`doc_store`])
//! A generic document store actor. Requests are handled one at a time, which makes
//! its conditional `update_one` an atomic compare-and-swap. That single primitive is all
//! the scheduler relies on for correctness under concurrency.
//!
//! ### 2. The Domain ([`model`], [`order_store`], [`policy`])
//! - [`model`]: the [`Order`](model::Order) record, its filters and patches.
//! - [`order_store`]: how orders plug into the store.
//! - [`policy`]: the one place that knows the stage chain and the delays.
//!
//! ### 3. The Workers ([`scheduler`], [`clients`])
//! - [`Scheduler`](scheduler::Scheduler): backfill pass, then advancement pass, per tick.
//! - [`OrderClient`](clients::OrderClient): places orders with their first schedule.
//!
//! ### 4. The Wiring ([`config`], [`runtime`])
//! [`KitchenConfig`](config::KitchenConfig) from `KITCHEN_*` variables, and
//! [`OrderSystem`](runtime::OrderSystem) to start, probe and stop everything.
//!
//! ## Running the Demo
//!
//! ```bash
//! RUST_LOG=info KITCHEN_STAGE_DELAY_MS=1500 cargo run
//! ```

pub mod clients;
pub mod config;
pub mod model;
pub mod order_store;
pub mod policy;
pub mod runtime;
pub mod scheduler;
