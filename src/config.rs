//! # Configuration
//!
//! Runtime settings for the store and the scheduling subsystem, with defaults that run
//! out of the box and `KITCHEN_*` environment overrides.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `KITCHEN_SCHEDULING_ENABLED` | `true` | Master switch for scheduling |
//! | `KITCHEN_TICK_INTERVAL_MS` | `1000` | Scheduler tick period |
//! | `KITCHEN_BATCH_SIZE` | `25` | Max records per scheduler pass |
//! | `KITCHEN_STAGE_DELAY_MS` | `5000` | Delay for every stage |
//! | `KITCHEN_PENDING_DELAY_MS` | stage delay | `pending → preparing` |
//! | `KITCHEN_PREPARING_DELAY_MS` | stage delay | `preparing → ready` |
//! | `KITCHEN_READY_DELAY_MS` | stage delay | `ready → served` |
//! | `KITCHEN_STORE_BUFFER` | `32` | Store request channel capacity |
//!
//! With scheduling disabled, orders never acquire `nextStatus`/`nextStatusAt` and stay at
//! their creation status.

use crate::policy::{LifecyclePolicy, StageDelays};
use crate::scheduler::SchedulerConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    pub store: StoreConfig,
    pub scheduling: SchedulingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub buffer_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    pub enabled: bool,
    pub tick_interval_ms: u64,
    pub batch_size: usize,
    pub delays: StageDelayConfig,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_ms: 1000,
            batch_size: 25,
            delays: StageDelayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageDelayConfig {
    pub pending_ms: u64,
    pub preparing_ms: u64,
    pub ready_ms: u64,
}

impl StageDelayConfig {
    pub fn uniform(ms: u64) -> Self {
        Self {
            pending_ms: ms,
            preparing_ms: ms,
            ready_ms: ms,
        }
    }
}

impl Default for StageDelayConfig {
    fn default() -> Self {
        Self::uniform(5000)
    }
}

impl SchedulingConfig {
    pub fn policy(&self) -> LifecyclePolicy {
        LifecyclePolicy::new(StageDelays {
            pending: millis(self.delays.pending_ms),
            preparing: millis(self.delays.preparing_ms),
            ready: millis(self.delays.ready_ms),
        })
    }

    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            batch_size: self.batch_size,
        }
    }
}

fn millis(ms: u64) -> chrono::Duration {
    chrono::Duration::milliseconds(i64::try_from(ms).unwrap_or(i64::MAX))
}

impl KitchenConfig {
    /// Loads defaults overridden by `KITCHEN_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads defaults overridden by whatever `lookup` returns for each `KITCHEN_*` key.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let scheduling = &mut config.scheduling;

        if let Some(enabled) = parse(&lookup, "KITCHEN_SCHEDULING_ENABLED", parse_bool)? {
            scheduling.enabled = enabled;
        }
        if let Some(ms) = parse(&lookup, "KITCHEN_TICK_INTERVAL_MS", from_str::<u64>)? {
            scheduling.tick_interval_ms = ms;
        }
        if let Some(size) = parse(&lookup, "KITCHEN_BATCH_SIZE", from_str::<usize>)? {
            scheduling.batch_size = size;
        }
        if let Some(ms) = parse(&lookup, "KITCHEN_STAGE_DELAY_MS", from_str::<u64>)? {
            scheduling.delays = StageDelayConfig::uniform(ms);
        }
        if let Some(ms) = parse(&lookup, "KITCHEN_PENDING_DELAY_MS", from_str::<u64>)? {
            scheduling.delays.pending_ms = ms;
        }
        if let Some(ms) = parse(&lookup, "KITCHEN_PREPARING_DELAY_MS", from_str::<u64>)? {
            scheduling.delays.preparing_ms = ms;
        }
        if let Some(ms) = parse(&lookup, "KITCHEN_READY_DELAY_MS", from_str::<u64>)? {
            scheduling.delays.ready_ms = ms;
        }
        if let Some(size) = parse(&lookup, "KITCHEN_STORE_BUFFER", from_str::<usize>)? {
            config.store.buffer_size = size;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.buffer_size == 0 {
            return Err(ConfigError::Zero("store buffer size"));
        }
        if self.scheduling.tick_interval_ms == 0 {
            return Err(ConfigError::Zero("tick interval"));
        }
        if self.scheduling.batch_size == 0 {
            return Err(ConfigError::Zero("batch size"));
        }
        Ok(())
    }
}

fn parse<F, T>(
    lookup: &F,
    key: &str,
    convert: fn(&str) -> Option<T>,
) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    convert(raw.trim())
        .map(Some)
        .ok_or_else(|| ConfigError::Invalid {
            key: key.to_string(),
            value: raw,
        })
}

fn from_str<T: FromStr>(raw: &str) -> Option<T> {
    raw.parse().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
