//! Tracing subscriber setup.
//!
//! Log levels come from `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run                          # placements, transitions, tick summaries
//! RUST_LOG=kitchen_orders=debug cargo run          # plus per-record decisions and lost races
//! ```

/// Installs the global subscriber. Call once, at the top of `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
