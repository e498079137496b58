//! Simulated platform
//!
//! In-process stand-ins for the microphone and the hardware recorder.
//! Denials, failures and latencies are injectable, and every hardware call
//! is appended to a shared [`CallLog`] so callers can assert on ordering.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use super::backend::{
    AudioStream, MediaCapture, RecorderControl, RecorderRegistry, RecordingSettings,
};
use crate::error::{CaptureError, RecorderError};

/// A call made against a simulated recorder
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareCall {
    ApplySettings(RecordingSettings),
    Start,
    Stop,
    Release,
}

/// Ordered record of hardware calls, shared between handles
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<HardwareCall>>>,
}

impl CallLog {
    fn push(&self, call: HardwareCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    /// Snapshot of all calls so far
    pub fn calls(&self) -> Vec<HardwareCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls matching `call`, ignoring settings payloads
    pub fn count(&self, call: &HardwareCall) -> usize {
        self.calls()
            .iter()
            .filter(|c| std::mem::discriminant(*c) == std::mem::discriminant(call))
            .count()
    }

    /// Settings passed to the most recent `apply_settings`
    pub fn last_settings(&self) -> Option<RecordingSettings> {
        self.calls().into_iter().rev().find_map(|c| match c {
            HardwareCall::ApplySettings(settings) => Some(settings),
            _ => None,
        })
    }
}

/// Microphone that denies the first `denials` requests
#[derive(Debug, Default)]
pub struct SimulatedCapture {
    denials_remaining: AtomicU32,
    requests: AtomicU32,
}

impl SimulatedCapture {
    pub fn new(denials: u32) -> Self {
        Self {
            denials_remaining: AtomicU32::new(denials),
            requests: AtomicU32::new(0),
        }
    }

    /// Total requests issued against this capture layer
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MediaCapture for SimulatedCapture {
    async fn request_audio_stream(&self) -> Result<AudioStream, CaptureError> {
        let request = self.requests.fetch_add(1, Ordering::SeqCst) + 1;

        let denied = self
            .denials_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

        if denied {
            debug!("Simulated microphone denied request #{}", request);
            return Err(CaptureError::DeviceBusy(
                "microphone held by another application".to_string(),
            ));
        }

        Ok(AudioStream::new("Simulated Microphone"))
    }
}

/// Failure and latency switches for a simulated recorder
#[derive(Debug, Clone, Default)]
pub struct RecorderBehavior {
    pub settings_latency: Duration,
    pub start_latency: Duration,
    pub stop_latency: Duration,
    pub fail_settings: bool,
    pub fail_start: bool,
    pub fail_stop: bool,
}

/// Registry producing [`SimulatedRecorder`] handles
#[derive(Debug, Default)]
pub struct SimulatedRegistry {
    behavior: RecorderBehavior,
    log: CallLog,
    fail_registration: AtomicBool,
}

impl SimulatedRegistry {
    pub fn new(behavior: RecorderBehavior) -> Self {
        Self {
            behavior,
            log: CallLog::default(),
            fail_registration: AtomicBool::new(false),
        }
    }

    /// Make every following `create_control` fail
    pub fn fail_registration(&self, fail: bool) {
        self.fail_registration.store(fail, Ordering::SeqCst);
    }

    /// Call log shared by all handles this registry creates
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

#[async_trait::async_trait]
impl RecorderRegistry for SimulatedRegistry {
    async fn create_control(
        &self,
        stream: &AudioStream,
    ) -> Result<Arc<dyn RecorderControl>, RecorderError> {
        if self.fail_registration.load(Ordering::SeqCst) {
            return Err(RecorderError::Registration(format!(
                "stream {} rejected",
                stream.id
            )));
        }

        info!("Simulated recorder created for {}", stream.device);
        Ok(Arc::new(SimulatedRecorder::new(
            self.behavior.clone(),
            self.log.clone(),
        )))
    }
}

/// Hardware recorder that only records what it was asked to do
#[derive(Debug)]
pub struct SimulatedRecorder {
    behavior: RecorderBehavior,
    log: CallLog,
    released: AtomicBool,
}

impl SimulatedRecorder {
    pub fn new(behavior: RecorderBehavior, log: CallLog) -> Self {
        Self {
            behavior,
            log,
            released: AtomicBool::new(false),
        }
    }

    async fn settle(latency: Duration) {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait::async_trait]
impl RecorderControl for SimulatedRecorder {
    async fn apply_settings(&self, settings: &RecordingSettings) -> Result<(), RecorderError> {
        self.log.push(HardwareCall::ApplySettings(settings.clone()));
        Self::settle(self.behavior.settings_latency).await;

        if self.behavior.fail_settings {
            return Err(RecorderError::Settings(format!(
                "unsupported format {}",
                settings.format.extension()
            )));
        }
        Ok(())
    }

    async fn start(&self) -> Result<(), RecorderError> {
        self.log.push(HardwareCall::Start);
        Self::settle(self.behavior.start_latency).await;

        if self.released.load(Ordering::SeqCst) {
            return Err(RecorderError::Released);
        }
        if self.behavior.fail_start {
            return Err(RecorderError::Start("encoder unavailable".to_string()));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), RecorderError> {
        self.log.push(HardwareCall::Stop);
        Self::settle(self.behavior.stop_latency).await;

        if self.behavior.fail_stop {
            return Err(RecorderError::Stop("file could not be finalized".to_string()));
        }
        Ok(())
    }

    fn release(&self) {
        self.log.push(HardwareCall::Release);
        self.released.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_capture_denies_then_grants() {
        let capture = SimulatedCapture::new(2);

        assert!(capture.request_audio_stream().await.is_err());
        assert!(capture.request_audio_stream().await.is_err());
        assert!(capture.request_audio_stream().await.is_ok());
        assert_eq!(capture.requests(), 3);
    }

    #[tokio::test]
    async fn test_call_log_counts_by_kind() {
        let log = CallLog::default();
        let recorder = SimulatedRecorder::new(RecorderBehavior::default(), log.clone());
        let settings = RecordingSettings {
            file_name: "a.amr".to_string(),
            format: Default::default(),
        };

        recorder.apply_settings(&settings).await.unwrap();
        recorder.start().await.unwrap();
        recorder.stop().await.unwrap();
        recorder.release();

        assert_eq!(log.count(&HardwareCall::Start), 1);
        assert_eq!(log.last_settings(), Some(settings));
        assert_eq!(log.calls().last(), Some(&HardwareCall::Release));
    }
}
