// Engine configuration consumed from the host process

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning knobs for the distributed lock.
///
/// Defaults follow the Redlock conventions: a short lease with a small
/// drift allowance, and a handful of jittered acquisition retries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    /// Fraction of the lease subtracted as clock-drift allowance
    pub drift_factor: f64,

    /// Acquisition attempts before giving up with LockUnavailable
    pub retry_count: u32,

    /// Fixed delay between acquisition attempts (ms)
    pub retry_delay_ms: u64,

    /// Random extra delay added to each retry, 0..=jitter (ms)
    pub retry_jitter_ms: u64,

    /// Lease duration; extended once per unit of work (ms)
    pub lease_ms: i64,
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            drift_factor: 0.01,
            retry_count: 5,
            retry_delay_ms: 100,
            retry_jitter_ms: 200,
            lease_ms: 1000, // short lease bounds the damage of a crashed holder
        }
    }
}

/// Top-level requeue engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RequeueConfig {
    /// Cooldown between promotion cycles, and idle backoff when no
    /// queues exist (seconds)
    pub wait_interval_secs: u64,

    /// Distributed lock tuning
    pub lock: LockSettings,
}

impl Default for RequeueConfig {
    fn default() -> Self {
        Self {
            wait_interval_secs: 5,
            lock: LockSettings::default(),
        }
    }
}

impl RequeueConfig {
    /// Cooldown interval as a Duration
    pub fn wait_interval(&self) -> Duration {
        Duration::from_secs(self.wait_interval_secs)
    }
}
