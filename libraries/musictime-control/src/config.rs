//! Timing and retry configuration for the control layer

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for playback control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Delay before re-querying the player after a control command (default: 1000ms)
    pub reconcile_delay_ms: u64,

    /// Delay before re-querying after an unconfirmed playlist launch (default: 500ms)
    pub launch_reconcile_delay_ms: u64,

    /// Delay between playlist launch attempts (default: 500ms)
    pub retry_delay_ms: u64,

    /// Delay before opening the Spotify web player when no device exists (default: 3200ms)
    pub launch_delay_ms: u64,

    /// Confirmation retries for playlist launches (default: 3)
    pub max_retry_count: u32,
}

impl ControlConfig {
    pub fn reconcile_delay(&self) -> Duration {
        Duration::from_millis(self.reconcile_delay_ms)
    }

    pub fn launch_reconcile_delay(&self) -> Duration {
        Duration::from_millis(self.launch_reconcile_delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.launch_delay_ms)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            reconcile_delay_ms: 1000,
            launch_reconcile_delay_ms: 500,
            retry_delay_ms: 500,
            launch_delay_ms: 3200,
            max_retry_count: 3,
        }
    }
}
