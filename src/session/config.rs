use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::audio::RecordingFormat;

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Recordings longer than this are stopped automatically
    /// Default: 10 seconds
    pub max_recording_time: Duration,

    /// How often elapsed time is recomputed and the cap checked
    /// Default: 10ms
    pub length_check_interval: Duration,

    /// Container format requested from the recorder
    pub format: RecordingFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_recording_time: Duration::from_millis(10_000),
            length_check_interval: Duration::from_millis(10),
            format: RecordingFormat::Amr,
        }
    }
}
