//! Error types for the recording controller
//!
//! Platform failures are cloned into events, so every variant carries its
//! detail as an owned string.

use serde::Serialize;
use thiserror::Error;

/// Failures while requesting a live audio input stream
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum CaptureError {
    #[error("Microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("Microphone is held by another application: {0}")]
    DeviceBusy(String),

    #[error("Audio input unavailable: {0}")]
    Unavailable(String),
}

/// Failures reported by the hardware recording handle
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RecorderError {
    #[error("Cannot create recorder from stream: {0}")]
    Registration(String),

    #[error("Cannot apply recording settings: {0}")]
    Settings(String),

    #[error("Recorder failed to start: {0}")]
    Start(String),

    #[error("Recorder failed to stop: {0}")]
    Stop(String),

    #[error("Recorder handle was already released")]
    Released,
}

/// Failures resolving the directory recordings are written to
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    #[error("Cannot resolve recording destination: {0}")]
    Unresolved(String),
}

/// Misuse of the recording session
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("A recorder handle is already registered with this session")]
    AlreadyRegistered,
}
