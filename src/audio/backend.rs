use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CaptureError, DestinationError, RecorderError};

/// Live audio input source handed out by the platform capture layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioStream {
    /// Unique stream identifier
    pub id: Uuid,
    /// Human-readable input device label (e.g. "Built-in Microphone")
    pub device: String,
}

impl AudioStream {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            device: device.into(),
        }
    }
}

/// Container format the recorder writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingFormat {
    /// Adaptive Multi-Rate, the recorder's native voice format
    #[default]
    Amr,
    /// Uncompressed PCM
    Wav,
}

impl RecordingFormat {
    /// File extension, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            RecordingFormat::Amr => "amr",
            RecordingFormat::Wav => "wav",
        }
    }
}

/// Settings applied to the recorder before each recording
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordingSettings {
    /// Output file name (no directory)
    pub file_name: String,
    /// Output container format
    pub format: RecordingFormat,
}

/// Platform media-capture layer
///
/// Each call issues exactly one request for microphone access. Denials are
/// usually transient: another application may still hold the microphone.
#[async_trait::async_trait]
pub trait MediaCapture: Send + Sync {
    /// Request a live audio input stream
    async fn request_audio_stream(&self) -> Result<AudioStream, CaptureError>;
}

/// Converts a live stream into a hardware recorder handle
#[async_trait::async_trait]
pub trait RecorderRegistry: Send + Sync {
    async fn create_control(
        &self,
        stream: &AudioStream,
    ) -> Result<Arc<dyn RecorderControl>, RecorderError>;
}

/// Hardware recorder handle
///
/// Owned exclusively by one recording session, reused across many
/// start/stop cycles and released once.
#[async_trait::async_trait]
pub trait RecorderControl: Send + Sync {
    /// Apply output settings for the next recording
    async fn apply_settings(&self, settings: &RecordingSettings) -> Result<(), RecorderError>;

    /// Begin recording; resolves once the hardware confirms
    async fn start(&self) -> Result<(), RecorderError>;

    /// Finish recording; resolves once the file is finalized
    async fn stop(&self) -> Result<(), RecorderError>;

    /// Give the hardware resource back to the platform
    fn release(&self);
}

/// Resolves the writable directory recordings are stored in
#[async_trait::async_trait]
pub trait DestinationResolver: Send + Sync {
    async fn resolve(&self) -> Result<PathBuf, DestinationError>;
}
