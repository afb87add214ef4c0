//! # Runtime
//!
//! Wires the order store, the order client and the scheduler into one running system,
//! and sets up the tracing subscriber the binary uses.
//!
//! ## Startup
//!
//! 1. The store actor is spawned first; everything else talks to it through clones of
//!    one [`StoreClient`](doc_store::StoreClient).
//! 2. The [`OrderClient`](crate::clients::OrderClient) is built with the configured
//!    [`LifecyclePolicy`](crate::policy::LifecyclePolicy).
//! 3. If scheduling is enabled and the store accepted the connection, the
//!    [`Scheduler`](crate::scheduler::Scheduler) is started. With scheduling disabled it
//!    is never constructed.
//!
//! ## Shutdown
//!
//! The scheduler is stopped first so no tick is left holding a store client. Dropping
//! the remaining clients then closes the store's channel and the actor drains and exits.
//!
//! ```rust,ignore
//! let system = OrderSystem::start(KitchenConfig::from_env()?)?;
//! let order = system.order_client.create_order("Ramen").await?;
//! println!("{}", serde_json::to_string(&system.health())?);
//! system.shutdown().await?;
//! ```

pub mod order_system;
pub mod tracing;

pub use order_system::*;
pub use tracing::*;
