//! Heartbeat configuration for the EI engine
//!
//! The heartbeat determines how frequently the emotion vector decays and is
//! published even without input activity.

use std::time::Duration;

/// Configuration for the engine heartbeat
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatConfig {
    /// How often to tick the decay loop (default: 50ms)
    pub interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(50),
        }
    }
}

impl HeartbeatConfig {
    pub fn from_millis(ms: u64) -> Self {
        // a zero period would make tokio::time::interval panic
        Self {
            interval: Duration::from_millis(ms.max(1)),
        }
    }
}
