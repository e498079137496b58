use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::audio::RecordingFormat;
use crate::session::SessionConfig;
use crate::stream::StreamConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub stream: StreamSection,
    pub recording: RecordingSection,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StreamSection {
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct RecordingSection {
    pub max_duration_ms: u64,
    pub length_check_interval_ms: u64,
    pub format: RecordingFormat,
    /// Fixed destination directory; the Sounds directory when unset
    pub destination: Option<String>,
}

impl Config {
    /// Load from a TOML file, falling back to defaults for missing keys
    pub fn load(path: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(path))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        Ok(settings.try_deserialize()?)
    }

    /// Built-in defaults only
    pub fn defaults() -> Result<Self> {
        Ok(Self::builder()?.build()?.try_deserialize()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("service.name", "voice-recorder")?
            .set_default("stream.max_attempts", 3_i64)?
            .set_default("stream.retry_delay_ms", 500_i64)?
            .set_default("recording.max_duration_ms", 10_000_i64)?
            .set_default("recording.length_check_interval_ms", 10_i64)?
            .set_default("recording.format", "amr")?)
    }

    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig {
            max_attempts: self.stream.max_attempts,
            retry_delay: Duration::from_millis(self.stream.retry_delay_ms),
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            max_recording_time: Duration::from_millis(self.recording.max_duration_ms),
            length_check_interval: Duration::from_millis(self.recording.length_check_interval_ms),
            format: self.recording.format,
        }
    }
}
