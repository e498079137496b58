use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a recording session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No recorder handle registered
    Idle,
    /// Handle held, no recording attempt in flight
    Ready,
    /// Start accepted, hardware not yet recording
    Starting,
    /// Hardware recording, length check armed
    Recording,
    /// Hardware stop issued, awaiting confirmation
    Stopping,
}

/// Point-in-time view of a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub state: SessionState,

    /// A recording attempt is in flight
    pub busy: bool,

    /// Length check is armed
    pub is_recording: bool,

    pub stop_requested: bool,

    /// The current attempt was cancelled before the hardware started
    pub cancelled: bool,

    /// Elapsed recording time in milliseconds
    pub elapsed_ms: u64,

    /// Destination of the current or last recording
    pub path: Option<PathBuf>,
}
