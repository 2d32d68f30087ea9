//! Transport configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Base URL of the backend API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl TransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Body of the test-data generation call (POST /api/satellite).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default = "default_satellite_count")]
    pub satellite_count: u32,
    #[serde(default = "default_trajectory_count")]
    pub trajectory_count: u32,
    #[serde(default = "default_analysis_type")]
    pub analysis_type: String,
}

fn default_satellite_count() -> u32 {
    12
}

fn default_trajectory_count() -> u32 {
    3
}

fn default_analysis_type() -> String {
    "visibility".to_string()
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            satellite_count: default_satellite_count(),
            trajectory_count: default_trajectory_count(),
            analysis_type: default_analysis_type(),
        }
    }
}
