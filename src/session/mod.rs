//! Recording session management
//!
//! This module provides the `RecordingSession` abstraction that manages:
//! - Ownership and release of the hardware recorder handle
//! - The busy / stop-requested state of each recording attempt
//! - The maximum recording duration, enforced by a periodic length check
//! - Lifecycle events on the shared event bus

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::{file_name_for, RecordingSession};
pub use stats::{SessionState, SessionStats};
