use std::path::PathBuf;

use serde::Serialize;

use crate::audio::AudioStream;
use crate::error::{CaptureError, RecorderError};

/// Lifecycle events published by the stream acquirer and recording session
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// Microphone access granted
    StreamReady { stream: AudioStream },
    /// Microphone access denied, another attempt is scheduled
    StreamRetry { attempt: u32, error: CaptureError },
    /// Microphone access denied on every attempt of a campaign
    CannotAccessAudio,

    /// Recorder handle registered with the session
    Ready,
    /// Recorder handle could not be created from the stream
    Error { error: RecorderError },
    /// Hardware confirmed recording has begun
    RecordingStart,
    /// Recording finished and the file was finalized
    RecordingDone { path: PathBuf },
    /// Recording failed to start or stop
    RecordingError { error: RecorderError },
    /// A stop arrived before recording started; hardware was never started
    RecordingCancel,
    /// Recorder handle released
    Release,
}

impl Event {
    /// Dotted event name, namespaced by the component that fires it
    pub fn name(&self) -> &'static str {
        match self {
            Event::StreamReady { .. } => "stream.ready",
            Event::StreamRetry { .. } => "stream.retry",
            Event::CannotAccessAudio => "stream.cannot.access.audio",
            Event::Ready => "audio.ready",
            Event::Error { .. } => "audio.error",
            Event::RecordingStart => "audio.recording.start",
            Event::RecordingDone { .. } => "audio.recording.done",
            Event::RecordingError { .. } => "audio.recording.error",
            Event::RecordingCancel => "audio.recording.cancel",
            Event::Release => "audio.release",
        }
    }

    /// Whether this event ends a recording attempt
    pub fn is_terminal_recording(&self) -> bool {
        matches!(
            self,
            Event::RecordingDone { .. } | Event::RecordingError { .. } | Event::RecordingCancel
        )
    }
}
