use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy for microphone acquisition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Attempts per campaign before giving up
    /// Default: 3
    pub max_attempts: u32,

    /// Fixed delay between attempts (no exponential backoff: denials are
    /// usually another application still holding the microphone)
    /// Default: 500ms
    pub retry_delay: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}
