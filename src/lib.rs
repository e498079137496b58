pub mod audio;
pub mod config;
pub mod error;
pub mod events;
pub mod recorder;
pub mod session;
pub mod stream;

pub use audio::{
    AudioStream, DestinationResolver, MediaCapture, RecorderControl, RecorderRegistry,
    RecordingFormat, RecordingSettings,
};
pub use config::Config;
pub use error::{CaptureError, DestinationError, RecorderError, SessionError};
pub use events::{Event, EventBus};
pub use recorder::{Platform, VoiceRecorder};
pub use session::{RecordingSession, SessionConfig, SessionState, SessionStats};
pub use stream::{StreamAcquirer, StreamConfig};
