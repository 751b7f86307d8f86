//! Operational limits of the connection loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Bounds and intervals governing the gateway loop.
///
/// The tick interval is the only suspension point in the loop and
/// doubles as the host heartbeat; sized so request-to-response latency
/// stays within tens of milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Limits {
    /// Maximum concurrent client connections (slot table size).
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
    /// Bounded wait at the top of each loop tick, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Cooldown between accepted critical requests, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Interval between counter snapshots handed to the heartbeat
    /// reporter, in seconds.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,
}

impl Limits {
    /// Bounded per-tick wait.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Critical-request cooldown window.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Heartbeat reporting interval.
    #[must_use]
    pub const fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_clients: default_max_clients(),
            tick_interval_ms: default_tick_interval_ms(),
            cooldown_secs: default_cooldown_secs(),
            heartbeat_secs: default_heartbeat_secs(),
        }
    }
}

const fn default_max_clients() -> usize {
    4
}

const fn default_tick_interval_ms() -> u64 {
    50
}

const fn default_cooldown_secs() -> u64 {
    5
}

const fn default_heartbeat_secs() -> u64 {
    10
}
