use super::config::SessionConfig;
use super::stats::{SessionState, SessionStats};
use crate::audio::{
    AudioStream, DestinationResolver, RecorderControl, RecorderRegistry, RecordingFormat,
    RecordingSettings,
};
use crate::error::{RecorderError, SessionError};
use crate::events::{Event, EventBus};
use chrono::{Local, NaiveDateTime};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Mutable session state, shared with the session's own background tasks
struct Inner {
    /// Hardware recorder handle
    control: Option<Arc<dyn RecorderControl>>,

    /// A recording attempt is in flight (accepted start until done/error)
    busy: bool,

    /// Latched by `stop_recording`, cleared by the next start
    stop_requested: bool,

    /// The current attempt was cancelled before the hardware started
    cancelled: bool,

    /// Directory new recordings are written to
    destination_dir: Option<PathBuf>,

    /// Destination of the current or last recording
    path: Option<PathBuf>,

    /// When the hardware confirmed the start
    started_at: Option<Instant>,

    /// Elapsed recording time, refreshed by the length check
    elapsed: Duration,

    /// Periodic length check; present exactly while recording
    length_check: Option<JoinHandle<()>>,

    /// Hardware stop in flight
    pending_stop: Option<JoinHandle<()>>,

    /// Generation of the current attempt; bumped on start and release
    attempt: u64,
}

impl Inner {
    fn state(&self) -> SessionState {
        if self.control.is_none() {
            SessionState::Idle
        } else if self.length_check.is_some() {
            SessionState::Recording
        } else if self.pending_stop.is_some() {
            SessionState::Stopping
        } else if self.busy {
            SessionState::Starting
        } else {
            SessionState::Ready
        }
    }
}

/// A recording session that owns one hardware recorder handle
///
/// All operations return immediately; hardware calls and the length check
/// run as background tasks and report back through the event bus. Clones
/// share the same session.
#[derive(Clone)]
pub struct RecordingSession {
    config: SessionConfig,
    events: EventBus,
    inner: Arc<Mutex<Inner>>,
}

impl RecordingSession {
    pub fn new(config: SessionConfig, events: EventBus) -> Self {
        Self {
            config,
            events,
            inner: Arc::new(Mutex::new(Inner {
                control: None,
                busy: false,
                stop_requested: false,
                cancelled: false,
                destination_dir: None,
                path: None,
                started_at: None,
                elapsed: Duration::ZERO,
                length_check: None,
                pending_stop: None,
                attempt: 0,
            })),
        }
    }

    /// Resolve the destination directory in the background
    ///
    /// Resolution failures are logged only; recordings started before a
    /// directory is known are written under their bare file name.
    pub fn init(&self, resolver: Arc<dyn DestinationResolver>) -> JoinHandle<()> {
        let session = self.clone();

        tokio::spawn(async move {
            match resolver.resolve().await {
                Ok(dir) => session.set_destination(dir),
                Err(e) => error!("Audio destination resolve error: {}", e),
            }
        })
    }

    pub fn set_destination(&self, dir: impl Into<PathBuf>) {
        self.lock().destination_dir = Some(dir.into());
    }

    /// Take ownership of a recorder handle and emit [`Event::Ready`]
    ///
    /// A session holds at most one handle; a second registration is
    /// rejected and the caller keeps the handle it offered.
    pub fn register_handle(&self, control: Arc<dyn RecorderControl>) -> Result<(), SessionError> {
        {
            let mut inner = self.lock();
            if inner.control.is_some() {
                warn!("Recorder handle already registered, rejecting another");
                return Err(SessionError::AlreadyRegistered);
            }
            inner.control = Some(control);
        }

        info!("Recorder handle registered");
        self.events.publish(Event::Ready);
        Ok(())
    }

    /// Create a recorder handle from `stream` and register it
    ///
    /// Emits [`Event::Error`] when the registry cannot create a handle.
    pub async fn register_stream(&self, registry: &dyn RecorderRegistry, stream: &AudioStream) {
        match registry.create_control(stream).await {
            Ok(control) => {
                if let Err(e) = self.register_handle(Arc::clone(&control)) {
                    warn!("Discarding recorder for stream {}: {}", stream.id, e);
                    control.release();
                }
            }
            Err(error) => {
                error!("Cannot create recorder for stream {}: {}", stream.id, error);
                self.events.publish(Event::Error { error });
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.lock().control.is_some()
    }

    /// True exactly while the length check is armed
    pub fn is_recording(&self) -> bool {
        self.lock().length_check.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    /// Elapsed time of the current recording, zero when idle
    pub fn recording_time(&self) -> Duration {
        self.lock().elapsed
    }

    pub fn max_recording_time(&self) -> Duration {
        self.config.max_recording_time
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    pub fn stats(&self) -> SessionStats {
        let inner = self.lock();

        SessionStats {
            state: inner.state(),
            busy: inner.busy,
            is_recording: inner.length_check.is_some(),
            stop_requested: inner.stop_requested,
            cancelled: inner.cancelled,
            elapsed_ms: inner.elapsed.as_millis() as u64,
            path: inner.path.clone(),
        }
    }

    /// Start a new recording
    ///
    /// Returns false without touching the hardware if an attempt is already
    /// in flight or no handle is registered. Otherwise the attempt is
    /// accepted and its outcome arrives as [`Event::RecordingStart`],
    /// [`Event::RecordingCancel`] or [`Event::RecordingError`].
    pub fn start_recording(&self) -> bool {
        let mut inner = self.lock();

        if inner.busy {
            debug!("Start rejected: a recording attempt is already in progress");
            return false;
        }
        let Some(control) = inner.control.clone() else {
            warn!("Start rejected: no recorder handle registered");
            return false;
        };

        inner.stop_requested = false;
        inner.cancelled = false;
        inner.busy = true;
        inner.attempt += 1;
        let attempt = inner.attempt;

        let file_name = file_name_for(Local::now().naive_local(), self.config.format);
        let path = match &inner.destination_dir {
            Some(dir) => dir.join(&file_name),
            None => {
                warn!(
                    "Recording destination not resolved, writing {} without a directory",
                    file_name
                );
                PathBuf::from(&file_name)
            }
        };
        info!("Starting recording: {}", path.display());
        inner.path = Some(path);

        let settings = RecordingSettings {
            file_name,
            format: self.config.format,
        };
        let session = self.clone();

        tokio::spawn(async move {
            let applied = control.apply_settings(&settings).await;
            session.on_settings_applied(attempt, control, applied).await;
        });

        true
    }

    async fn on_settings_applied(
        &self,
        attempt: u64,
        control: Arc<dyn RecorderControl>,
        applied: Result<(), RecorderError>,
    ) {
        if let Err(error) = applied {
            self.fail_attempt(attempt, error);
            return;
        }

        {
            let mut inner = self.lock();
            if inner.attempt != attempt {
                // Only release closes an attempt early, and release stops first
                drop(inner);
                info!("Recording cancelled by release before the recorder started");
                self.events.publish(Event::RecordingCancel);
                return;
            }
            if inner.stop_requested {
                // busy stays set until the caller stops or releases
                inner.cancelled = true;
                drop(inner);
                info!("Recording cancelled before the recorder started");
                self.events.publish(Event::RecordingCancel);
                return;
            }
        }

        let started = control.start().await;

        let mut inner = self.lock();
        if inner.attempt != attempt {
            debug!("Ignoring start result of stale attempt {}", attempt);
            return;
        }

        match started {
            Ok(()) => {
                inner.started_at = Some(Instant::now());
                inner.elapsed = Duration::ZERO;
                inner.length_check = Some(self.spawn_length_check(attempt));
                let stop_requested = inner.stop_requested;
                drop(inner);

                info!("Recording started");
                self.events.publish(Event::RecordingStart);

                if stop_requested {
                    debug!("Stop arrived while the recorder was starting");
                    self.stop_recording();
                }
            }
            Err(error) => {
                drop(inner);
                self.fail_attempt(attempt, error);
            }
        }
    }

    fn fail_attempt(&self, attempt: u64, error: RecorderError) {
        {
            let mut inner = self.lock();
            if inner.attempt == attempt {
                inner.busy = false;
            } else {
                debug!("Attempt {} already closed by release", attempt);
            }
        }

        error!("Recording failed: {}", error);
        self.events.publish(Event::RecordingError { error });
    }

    fn spawn_length_check(&self, attempt: u64) -> JoinHandle<()> {
        let session = self.clone();
        let period = self.config.length_check_interval.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                if !session.check_length(attempt) {
                    break;
                }
            }
        })
    }

    /// Refresh elapsed time; returns false once the check should end
    fn check_length(&self, attempt: u64) -> bool {
        let over_limit = {
            let mut inner = self.lock();
            if inner.attempt != attempt || inner.length_check.is_none() {
                return false;
            }
            let Some(started_at) = inner.started_at else {
                return false;
            };
            inner.elapsed = started_at.elapsed();
            inner.elapsed > self.config.max_recording_time
        };

        if over_limit {
            info!(
                "Maximum recording time of {:?} reached",
                self.config.max_recording_time
            );
            self.stop_recording();
            return false;
        }

        true
    }

    /// Stop the current recording
    ///
    /// Safe to call at any time and any number of times. A stop that
    /// arrives before the recorder starts is remembered and cancels the
    /// start. The outcome arrives as [`Event::RecordingDone`] or
    /// [`Event::RecordingError`].
    pub fn stop_recording(&self) {
        let mut inner = self.lock();
        inner.stop_requested = true;

        if inner.cancelled {
            inner.cancelled = false;
            inner.busy = false;
            debug!("Cancelled recording attempt resolved by stop");
            return;
        }

        let Some(length_check) = inner.length_check.take() else {
            return;
        };
        length_check.abort();

        let Some(control) = inner.control.clone() else {
            return;
        };

        let attempt = inner.attempt;
        let path = inner.path.clone().unwrap_or_default();
        let session = self.clone();

        info!("Stopping recording");
        inner.pending_stop = Some(tokio::spawn(async move {
            let stopped = control.stop().await;
            session.on_stopped(attempt, path, stopped);
        }));
    }

    fn on_stopped(&self, attempt: u64, path: PathBuf, stopped: Result<(), RecorderError>) {
        {
            let mut inner = self.lock();
            if inner.attempt == attempt {
                inner.busy = false;
                inner.pending_stop = None;
                inner.started_at = None;
                inner.elapsed = Duration::ZERO;
            }
        }

        match stopped {
            Ok(()) => {
                info!("Recording saved to {}", path.display());
                self.events.publish(Event::RecordingDone { path });
            }
            Err(error) => {
                error!("Recording failed to stop: {}", error);
                self.events.publish(Event::RecordingError { error });
            }
        }
    }

    /// Release the recorder handle
    ///
    /// Stops a recording in progress first. The handle reference is dropped
    /// and [`Event::Release`] emitted immediately; the hardware itself is
    /// released once any in-flight stop has finished. No-op without a
    /// handle.
    pub fn release(&self) {
        let busy = self.lock().busy;
        if busy {
            self.stop_recording();
        }

        let mut inner = self.lock();
        inner.busy = false;
        inner.cancelled = false;
        inner.attempt += 1;
        inner.started_at = None;
        inner.elapsed = Duration::ZERO;
        let pending_stop = inner.pending_stop.take();
        let Some(control) = inner.control.take() else {
            return;
        };
        drop(inner);

        match pending_stop {
            Some(stop) => {
                tokio::spawn(async move {
                    if let Err(e) = stop.await {
                        warn!("Recorder stop task failed before release: {}", e);
                    }
                    control.release();
                });
            }
            None => control.release(),
        }

        info!("Recorder handle released");
        self.events.publish(Event::Release);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `yyyymmdd_HHMMSS.<ext>` for a recording started at `timestamp`
pub fn file_name_for(timestamp: NaiveDateTime, format: RecordingFormat) -> String {
    format!(
        "{}.{}",
        timestamp.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_file_name_for() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(9, 7, 2)
            .unwrap();

        assert_eq!(file_name_for(timestamp, RecordingFormat::Amr), "20240305_090702.amr");
        assert_eq!(file_name_for(timestamp, RecordingFormat::Wav), "20240305_090702.wav");
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = RecordingSession::new(SessionConfig::default(), EventBus::default());

        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.is_ready());
        assert!(!session.is_recording());
        assert!(!session.is_busy());
        assert_eq!(session.recording_time(), Duration::ZERO);
    }

    #[test]
    fn test_start_without_handle_is_rejected() {
        let session = RecordingSession::new(SessionConfig::default(), EventBus::default());

        assert!(!session.start_recording());
        assert!(!session.is_busy());
    }

    #[test]
    fn test_release_without_handle_is_noop() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let session = RecordingSession::new(SessionConfig::default(), bus);

        session.release();
        session.release();

        assert!(rx.try_recv().is_err());
    }
}
