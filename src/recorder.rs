//! Wiring between stream acquisition and the recording session

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::audio::{
    DestinationResolver, FixedDestination, MediaCapture, RecorderRegistry, SoundsDirectory,
};
use crate::config::Config;
use crate::events::{Event, EventBus};
use crate::session::RecordingSession;
use crate::stream::StreamAcquirer;

/// Platform collaborators the recorder drives
#[derive(Clone)]
pub struct Platform {
    pub capture: Arc<dyn MediaCapture>,
    pub registry: Arc<dyn RecorderRegistry>,
    pub destination: Arc<dyn DestinationResolver>,
}

impl Platform {
    /// Destination resolver for the configured directory, or the Sounds
    /// directory when none is configured
    pub fn destination_for(config: &Config) -> Arc<dyn DestinationResolver> {
        match &config.recording.destination {
            Some(dir) => Arc::new(FixedDestination::new(dir)),
            None => Arc::new(SoundsDirectory),
        }
    }
}

/// A stream acquirer and a recording session sharing one event bus
pub struct VoiceRecorder {
    events: EventBus,
    acquirer: StreamAcquirer,
    session: RecordingSession,
    platform: Platform,

    /// Task registering a recorder for every acquired stream
    forwarder: Mutex<Option<JoinHandle<()>>>,
}

impl VoiceRecorder {
    pub fn new(config: &Config, platform: Platform) -> Self {
        let events = EventBus::default();
        let acquirer = StreamAcquirer::new(
            Arc::clone(&platform.capture),
            events.clone(),
            config.stream_config(),
        );
        let session = RecordingSession::new(config.session_config(), events.clone());

        Self {
            events,
            acquirer,
            session,
            platform,
            forwarder: Mutex::new(None),
        }
    }

    /// Resolve the destination, then acquire a stream and register a
    /// recorder for it
    ///
    /// Every [`Event::StreamReady`] is forwarded to the session until
    /// [`shutdown`](Self::shutdown). Calling `init` again replaces the
    /// forwarder.
    pub fn init(&self) {
        self.session.init(Arc::clone(&self.platform.destination));

        let session = self.session.clone();
        let registry = Arc::clone(&self.platform.registry);
        let forwarder = self.events.listen(move |event| {
            if let Event::StreamReady { stream } = event {
                info!("Registering recorder for stream {}", stream.id);
                let session = session.clone();
                let registry = Arc::clone(&registry);
                tokio::spawn(async move {
                    session.register_stream(registry.as_ref(), &stream).await;
                });
            }
        });

        if let Some(previous) = self.forwarder_slot().replace(forwarder) {
            debug!("Replacing stream forwarder");
            previous.abort();
        }

        self.acquirer.acquire();
    }

    /// True while acquired streams are being forwarded to the session
    pub fn is_forwarding(&self) -> bool {
        self.forwarder_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn acquirer(&self) -> &StreamAcquirer {
        &self.acquirer
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// Stop forwarding streams, then release the recorder handle,
    /// stopping any recording in progress
    pub fn shutdown(&self) {
        if let Some(forwarder) = self.forwarder_slot().take() {
            forwarder.abort();
        }
        self.session.release();
    }

    fn forwarder_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.forwarder.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        if let Some(forwarder) = self.forwarder_slot().take() {
            forwarder.abort();
        }
    }
}
