//! Monitor configuration. Immutable after process start.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Grace period and sampling cadences for the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Minutes of uninterrupted disconnected+idle time before shutdown.
    pub grace_minutes: u32,
    /// Decision-loop tick cadence in milliseconds.
    pub tick_interval_ms: u64,
    /// Input sampling cadence in milliseconds. Must stay strictly below
    /// `tick_interval_ms` so activity is observed before the next tick.
    pub activity_poll_ms: u64,
    /// Reachability sampling cadence in milliseconds.
    pub net_poll_ms: u64,
    /// Reachability probe targets (`host:port`).
    pub probe_addrs: Vec<String>,
    /// Per-target TCP connect timeout in milliseconds.
    pub probe_timeout_ms: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            grace_minutes: 2,
            tick_interval_ms: 1_000,
            activity_poll_ms: 100,
            net_poll_ms: 500,
            probe_addrs: vec!["1.1.1.1:53".to_string(), "8.8.8.8:53".to_string()],
            probe_timeout_ms: 1_500,
        }
    }
}

impl MonitorConfig {
    /// Grace period in milliseconds.
    pub fn grace_ms(&self) -> u64 {
        u64::from(self.grace_minutes) * 60_000
    }

    /// Activity threshold in seconds: idle time below one tick interval
    /// means activity happened since the previous tick.
    pub fn tick_interval_secs(&self) -> f64 {
        self.tick_interval_ms as f64 / 1_000.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grace_minutes == 0 {
            return Err(ConfigError::ZeroGrace);
        }
        if self.tick_interval_ms == 0 || self.activity_poll_ms == 0 || self.net_poll_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.activity_poll_ms >= self.tick_interval_ms {
            return Err(ConfigError::ActivityPollTooSlow {
                activity_poll_ms: self.activity_poll_ms,
                tick_interval_ms: self.tick_interval_ms,
            });
        }
        if self.probe_addrs.is_empty() {
            return Err(ConfigError::NoProbeTargets);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroGrace,
    ZeroInterval,
    ActivityPollTooSlow {
        activity_poll_ms: u64,
        tick_interval_ms: u64,
    },
    NoProbeTargets,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroGrace => write!(f, "grace period must be at least 1 minute"),
            Self::ZeroInterval => write!(f, "sampling intervals must be non-zero"),
            Self::ActivityPollTooSlow {
                activity_poll_ms,
                tick_interval_ms,
            } => write!(
                f,
                "activity poll interval ({activity_poll_ms}ms) must be below the tick interval ({tick_interval_ms}ms)"
            ),
            Self::NoProbeTargets => write!(f, "at least one reachability probe target is required"),
        }
    }
}

impl std::error::Error for ConfigError {}
