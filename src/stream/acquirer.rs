use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::config::StreamConfig;
use crate::audio::MediaCapture;
use crate::events::{Event, EventBus};

/// Obtains a live microphone stream, retrying transient denials
///
/// The attempt counter belongs to the acquirer, not to a single
/// `acquire()` call: overlapping campaigns share it, and it only returns to
/// zero on success or when a campaign gives up.
#[derive(Clone)]
pub struct StreamAcquirer {
    capture: Arc<dyn MediaCapture>,
    events: EventBus,
    config: StreamConfig,
    attempts: Arc<AtomicU32>,
}

impl StreamAcquirer {
    pub fn new(capture: Arc<dyn MediaCapture>, events: EventBus, config: StreamConfig) -> Self {
        Self {
            capture,
            events,
            config,
            attempts: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Start an acquisition campaign
    ///
    /// Emits [`Event::StreamRetry`] for each denied attempt that will be
    /// retried, then either [`Event::StreamReady`] or
    /// [`Event::CannotAccessAudio`].
    pub fn acquire(&self) -> JoinHandle<()> {
        let acquirer = self.clone();
        tokio::spawn(async move { acquirer.run_campaign().await })
    }

    /// Failed attempts in the current campaign
    pub fn attempt_count(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn run_campaign(&self) {
        let max_attempts = self.config.max_attempts.max(1);

        loop {
            match self.capture.request_audio_stream().await {
                Ok(stream) => {
                    self.attempts.store(0, Ordering::SeqCst);
                    info!("Audio stream acquired from {}", stream.device);
                    self.events.publish(Event::StreamReady { stream });
                    return;
                }
                Err(error) => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;

                    if attempt >= max_attempts {
                        self.attempts.store(0, Ordering::SeqCst);
                        warn!(
                            "Cannot access audio after {} attempts: {}",
                            attempt, error
                        );
                        self.events.publish(Event::CannotAccessAudio);
                        return;
                    }

                    warn!(
                        "Audio stream attempt {}/{} failed: {}; retrying in {:?}",
                        attempt, max_attempts, error, self.config.retry_delay
                    );
                    self.events.publish(Event::StreamRetry { attempt, error });
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }
}
