//! Playback controller.
//!
//! Sole owner of the audio output handle. Every operation that touches the
//! output runs under one FIFO-fair async mutex, so requests are applied in the
//! order they were issued and a station change always tears down the previous
//! stream before the next start attempt.
//!
//! Stream-start failures end here: they are logged, stored as `last_error` and
//! emitted, never returned to the caller and never retried.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;

use crate::audio::AudioOutput;
use crate::constants::TIMER_EXPIRY_NOTICE;
use crate::error::RadioResult;
use crate::events::{EventEmitter, PlaybackEvent, StopReason};
use crate::services::sleep_timer::ExpiryTarget;
use crate::state::PlaybackState;
use crate::utils::{clamp_volume, now_millis};

/// Drives the host audio output and keeps [`PlaybackState`] in sync with it.
pub struct PlaybackController {
    output: Mutex<Box<dyn AudioOutput>>,
    state: RwLock<PlaybackState>,
    emitter: Arc<dyn EventEmitter>,
}

impl PlaybackController {
    /// Creates a controller. Nothing is loaded until the first
    /// [`select_station`](Self::select_station) or [`cue`](Self::cue).
    pub fn new(
        output: Box<dyn AudioOutput>,
        initial_address: impl Into<String>,
        volume: f32,
        emitter: Arc<dyn EventEmitter>,
    ) -> Self {
        Self {
            output: Mutex::new(output),
            state: RwLock::new(PlaybackState {
                current_stream_address: initial_address.into(),
                is_playing: false,
                volume: volume.clamp(0.0, 1.0),
                last_error: None,
            }),
            emitter,
        }
    }

    /// Returns a snapshot of the playback state.
    pub fn state(&self) -> PlaybackState {
        self.state.read().clone()
    }

    /// Loads the current address and applies the volume without starting.
    pub async fn cue(&self) {
        let mut output = self.output.lock().await;
        let (address, volume) = {
            let state = self.state.read();
            (state.current_stream_address.clone(), state.volume)
        };
        output.load(&address).await;
        output.set_volume(volume).await;
        log::debug!("[Controller] Cued {}", address);
    }

    /// Switches to `address` and attempts to start it.
    ///
    /// Any running stream is stopped and unloaded first. The returned snapshot
    /// reflects the start outcome.
    pub async fn select_station(&self, address: &str) -> PlaybackState {
        let mut output = self.output.lock().await;

        let (previous, was_playing, volume) = {
            let state = self.state.read();
            (
                state.current_stream_address.clone(),
                state.is_playing,
                state.volume,
            )
        };

        if was_playing {
            output.pause().await;
            self.state.write().is_playing = false;
            self.emitter.emit_playback(PlaybackEvent::Stopped {
                stream_address: previous.clone(),
                reason: StopReason::StationChange,
                timestamp: now_millis(),
            });
        }

        output.load(address).await;
        {
            let mut state = self.state.write();
            state.current_stream_address = address.to_string();
            state.last_error = None;
        }
        log::info!("[Controller] Station changed: {} -> {}", previous, address);
        self.emitter.emit_playback(PlaybackEvent::StationChanged {
            stream_address: address.to_string(),
            timestamp: now_millis(),
        });

        output.set_volume(volume).await;
        self.start_locked(&mut **output).await;
        self.state()
    }

    /// Stops when playing, otherwise attempts to start.
    pub async fn toggle_playback(&self) -> PlaybackState {
        let mut output = self.output.lock().await;

        let (address, playing) = {
            let state = self.state.read();
            (state.current_stream_address.clone(), state.is_playing)
        };

        if playing {
            output.pause().await;
            self.state.write().is_playing = false;
            log::info!("[Controller] Stopped {}", address);
            self.emitter.emit_playback(PlaybackEvent::Stopped {
                stream_address: address,
                reason: StopReason::User,
                timestamp: now_millis(),
            });
        } else {
            self.start_locked(&mut **output).await;
        }
        self.state()
    }

    /// Clamps `volume` to `[0, 1]` and applies it to the output, playing or not.
    ///
    /// Returns the volume actually applied.
    ///
    /// # Errors
    ///
    /// Returns [`RadioError::InvalidVolume`](crate::error::RadioError) for NaN.
    pub async fn set_volume(&self, volume: f32) -> RadioResult<f32> {
        let volume = clamp_volume(volume)?;
        let mut output = self.output.lock().await;
        output.set_volume(volume).await;
        self.state.write().volume = volume;
        self.emitter.emit_playback(PlaybackEvent::VolumeChanged {
            volume,
            timestamp: now_millis(),
        });
        Ok(volume)
    }

    /// Forces playback off and posts the timer-expiry notice.
    pub async fn stop_for_timer_expiry(&self) {
        let mut output = self.output.lock().await;
        output.pause().await;

        let address = {
            let mut state = self.state.write();
            state.is_playing = false;
            state.last_error = Some(TIMER_EXPIRY_NOTICE.to_string());
            state.current_stream_address.clone()
        };
        log::info!("[Controller] Sleep timer stopped {}", address);
        self.emitter.emit_playback(PlaybackEvent::Stopped {
            stream_address: address,
            reason: StopReason::Timer,
            timestamp: now_millis(),
        });
    }

    /// Releases the audio output. Used on shutdown.
    pub async fn release(&self) {
        let mut output = self.output.lock().await;
        output.release().await;

        let (address, was_playing) = {
            let mut state = self.state.write();
            let was_playing = state.is_playing;
            state.is_playing = false;
            (state.current_stream_address.clone(), was_playing)
        };
        if was_playing {
            self.emitter.emit_playback(PlaybackEvent::Stopped {
                stream_address: address,
                reason: StopReason::Shutdown,
                timestamp: now_millis(),
            });
        }
        log::debug!("[Controller] Audio output released");
    }

    /// Attempts to start the loaded stream. Caller holds the output lock.
    async fn start_locked(&self, output: &mut dyn AudioOutput) -> bool {
        let address = self.state.read().current_stream_address.clone();

        match output.play().await {
            Ok(()) => {
                {
                    let mut state = self.state.write();
                    state.is_playing = true;
                    state.last_error = None;
                }
                log::info!("[Controller] Playing {}", address);
                self.emitter.emit_playback(PlaybackEvent::Started {
                    stream_address: address,
                    timestamp: now_millis(),
                });
                true
            }
            Err(e) => {
                log::warn!(
                    "[Controller] Failed to start {}: {}",
                    address,
                    e.detail().unwrap_or_else(|| e.message())
                );
                {
                    let mut state = self.state.write();
                    state.is_playing = false;
                    state.last_error = Some(e.message().to_string());
                }
                self.emitter.emit_playback(PlaybackEvent::Failed {
                    stream_address: address,
                    message: e.message().to_string(),
                    timestamp: now_millis(),
                });
                false
            }
        }
    }
}

#[async_trait]
impl ExpiryTarget for PlaybackController {
    async fn on_timer_expired(&self) {
        self.stop_for_timer_expiry().await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;

    use crate::constants::STREAM_FAILURE_NOTICE;
    use crate::error::{StreamError, StreamResult};
    use crate::events::NoopEventEmitter;

    /// A call observed by [`MockOutput`].
    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Load(String),
        Play(String),
        Pause,
        Volume(f32),
        Release,
    }

    /// Shared record of what the mock output saw.
    #[derive(Default)]
    pub(crate) struct MockLog {
        pub calls: parking_lot::Mutex<Vec<Call>>,
        pub failing: parking_lot::Mutex<HashSet<String>>,
        pub volume: parking_lot::Mutex<Option<f32>>,
    }

    impl MockLog {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        pub fn fail(&self, address: &str) {
            self.failing.lock().insert(address.to_string());
        }

        pub fn recover(&self, address: &str) {
            self.failing.lock().remove(address);
        }
    }

    /// Host audio double; start fails for addresses marked in `failing`.
    pub(crate) struct MockOutput {
        log: Arc<MockLog>,
        loaded: Option<String>,
    }

    impl MockOutput {
        pub fn new() -> (Self, Arc<MockLog>) {
            let log = Arc::new(MockLog::default());
            (
                Self {
                    log: log.clone(),
                    loaded: None,
                },
                log,
            )
        }
    }

    #[async_trait]
    impl AudioOutput for MockOutput {
        async fn load(&mut self, address: &str) {
            self.loaded = Some(address.to_string());
            self.log.calls.lock().push(Call::Load(address.to_string()));
        }

        async fn play(&mut self) -> StreamResult<()> {
            // Suspend like a real start would.
            tokio::task::yield_now().await;
            let address = self.loaded.clone().unwrap_or_default();
            self.log.calls.lock().push(Call::Play(address.clone()));
            if self.log.failing.lock().contains(&address) {
                return Err(StreamError::failed_to_start("mock rejected stream"));
            }
            Ok(())
        }

        async fn pause(&mut self) {
            self.log.calls.lock().push(Call::Pause);
        }

        async fn set_volume(&mut self, volume: f32) {
            *self.log.volume.lock() = Some(volume);
            self.log.calls.lock().push(Call::Volume(volume));
        }

        async fn release(&mut self) {
            self.log.calls.lock().push(Call::Release);
        }
    }

    fn controller(initial: &str) -> (PlaybackController, Arc<MockLog>) {
        let (output, log) = MockOutput::new();
        let controller =
            PlaybackController::new(Box::new(output), initial, 0.5, Arc::new(NoopEventEmitter));
        (controller, log)
    }

    #[tokio::test]
    async fn select_station_plays_every_configured_station() {
        let (controller, _log) = controller("u1");
        for address in ["u1", "u2", "u3"] {
            let state = controller.select_station(address).await;
            assert_eq!(state.current_stream_address, address);
            assert!(state.is_playing);
            assert_eq!(state.last_error, None);
        }
    }

    #[tokio::test]
    async fn station_change_stops_previous_stream_before_loading_next() {
        let (controller, log) = controller("u1");
        controller.select_station("u1").await;
        log.calls.lock().clear();

        let state = controller.select_station("u2").await;

        assert_eq!(state.current_stream_address, "u2");
        assert!(state.is_playing);
        assert_eq!(state.last_error, None);
        assert_eq!(
            log.calls(),
            vec![
                Call::Pause,
                Call::Load("u2".into()),
                Call::Volume(0.5),
                Call::Play("u2".into()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_start_reports_notice_and_stays_stopped() {
        let (controller, log) = controller("u1");
        controller.select_station("u1").await;
        log.fail("u2");

        let state = controller.select_station("u2").await;

        assert_eq!(state.current_stream_address, "u2");
        assert!(!state.is_playing);
        assert_eq!(state.last_error.as_deref(), Some(STREAM_FAILURE_NOTICE));
    }

    #[tokio::test]
    async fn toggling_twice_from_stopped_returns_to_stopped_without_error() {
        let (controller, log) = controller("u1");
        controller.cue().await;

        let state = controller.toggle_playback().await;
        assert!(state.is_playing);

        let state = controller.toggle_playback().await;
        assert!(!state.is_playing);
        assert_eq!(state.last_error, None);
        assert_eq!(log.calls().last(), Some(&Call::Pause));
    }

    #[tokio::test]
    async fn toggle_failure_then_retry_clears_error() {
        let (controller, log) = controller("u1");
        controller.cue().await;
        log.fail("u1");

        let state = controller.toggle_playback().await;
        assert!(!state.is_playing);
        assert_eq!(state.last_error.as_deref(), Some(STREAM_FAILURE_NOTICE));

        log.recover("u1");
        let state = controller.toggle_playback().await;
        assert!(state.is_playing);
        assert_eq!(state.last_error, None);
    }

    #[tokio::test]
    async fn set_volume_is_idempotent_in_any_play_state() {
        let (controller, log) = controller("u1");

        for _ in 0..2 {
            assert_eq!(controller.set_volume(0.3).await.unwrap(), 0.3);
            assert_eq!(*log.volume.lock(), Some(0.3));
            assert_eq!(controller.state().volume, 0.3);
        }

        controller.select_station("u1").await;
        assert_eq!(controller.set_volume(0.7).await.unwrap(), 0.7);
        assert_eq!(*log.volume.lock(), Some(0.7));
        assert!(controller.state().is_playing);
    }

    #[tokio::test]
    async fn set_volume_clamps_and_rejects_nan() {
        let (controller, _log) = controller("u1");
        assert_eq!(controller.set_volume(1.8).await.unwrap(), 1.0);
        assert_eq!(controller.set_volume(-1.0).await.unwrap(), 0.0);
        assert!(controller.set_volume(f32::NAN).await.is_err());
        assert_eq!(controller.state().volume, 0.0);
    }

    #[tokio::test]
    async fn set_volume_applies_whole_percent_steps() {
        let (controller, log) = controller("u1");
        assert_eq!(controller.set_volume(0.333).await.unwrap(), 0.33);
        assert_eq!(*log.volume.lock(), Some(0.33));
        assert_eq!(controller.state().volume, 0.33);
    }

    #[tokio::test]
    async fn timer_expiry_stops_and_posts_notice() {
        let (controller, log) = controller("u1");
        controller.select_station("u1").await;

        controller.on_timer_expired().await;

        let state = controller.state();
        assert!(!state.is_playing);
        assert_eq!(state.last_error.as_deref(), Some(TIMER_EXPIRY_NOTICE));
        assert_eq!(log.calls().last(), Some(&Call::Pause));
    }

    #[tokio::test]
    async fn concurrent_station_changes_apply_in_issue_order() {
        let (controller, log) = controller("u1");
        let controller = Arc::new(controller);

        let first = controller.select_station("u2");
        let second = controller.select_station("u3");
        tokio::join!(first, second);

        assert_eq!(controller.state().current_stream_address, "u3");
        let loads: Vec<_> = log
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Load(_) | Call::Play(_)))
            .collect();
        assert_eq!(
            loads,
            vec![
                Call::Load("u2".into()),
                Call::Play("u2".into()),
                Call::Load("u3".into()),
                Call::Play("u3".into()),
            ]
        );
    }

    #[tokio::test]
    async fn release_stops_playback() {
        let (controller, log) = controller("u1");
        controller.select_station("u1").await;

        controller.release().await;

        assert!(!controller.state().is_playing);
        assert_eq!(log.calls().last(), Some(&Call::Release));
    }
}
