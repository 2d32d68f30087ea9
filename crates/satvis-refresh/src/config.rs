//! Refresh configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Auto refresh settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    /// Start polling automatically.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Interval between ticks in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    5_000
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}
