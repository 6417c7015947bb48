//! Player bootstrap and dependency wiring.
//!
//! This module is the composition root: the one place where the station
//! selector, playback controller, sleep timer and clock are created and wired
//! to a shared event bridge and cancellation token.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::audio::AudioOutput;
use crate::constants::EVENT_CHANNEL_CAPACITY;
use crate::error::RadioResult;
use crate::events::{BroadcastEventBridge, EventEmitter};
use crate::runtime::TokioSpawner;
use crate::services::{ClockDisplay, ExpiryTarget, PlaybackController, SleepTimer};
use crate::state::{ClockState, PlaybackState, PlayerConfig, TimerState};
use crate::station::{default_stations, Station, StationSelector};

/// Container for all bootstrapped player services.
pub struct PlayerServices {
    /// Station table and current selection.
    ///
    /// Held across the controller call on every change so the selection and
    /// the loaded stream never disagree.
    selector: Mutex<StationSelector>,
    /// Sole owner of the audio output.
    pub controller: Arc<PlaybackController>,
    /// Countdown that stops playback.
    pub sleep_timer: Arc<SleepTimer>,
    /// Current-time readout.
    pub clock: Arc<ClockDisplay>,
    /// Fan-out of player events to front ends.
    pub event_bridge: Arc<BroadcastEventBridge>,
    /// Task spawner for background operations.
    pub spawner: TokioSpawner,
    /// Cancellation token for graceful shutdown.
    pub cancel_token: CancellationToken,
    config: PlayerConfig,
}

impl PlayerServices {
    /// Brings the player to its initial state.
    ///
    /// With autoplay the initial station is started; otherwise it is only
    /// loaded so the first toggle starts it.
    pub async fn initialize(&self) -> PlaybackState {
        if self.config.autoplay {
            let address = self.selector.lock().await.selected().stream_address.clone();
            self.controller.select_station(&address).await
        } else {
            self.controller.cue().await;
            self.controller.state()
        }
    }

    /// Starts the clock refresh.
    pub fn start_background_tasks(&self) {
        self.clock.start(&self.spawner, &self.cancel_token);
    }

    /// Switches to the station with stream address `address`.
    ///
    /// # Errors
    ///
    /// Returns [`RadioError::UnknownStation`](crate::error::RadioError) if
    /// the address is not in the station table. Stream failures are not
    /// errors here; they show in the returned state.
    pub async fn change_station(&self, address: &str) -> RadioResult<PlaybackState> {
        let mut selector = self.selector.lock().await;
        let address = selector.select_address(address)?.stream_address.clone();
        Ok(self.controller.select_station(&address).await)
    }

    /// Switches to the station at zero-based `index`.
    ///
    /// # Errors
    ///
    /// Returns [`RadioError::UnknownStation`](crate::error::RadioError) if
    /// `index` is out of range.
    pub async fn change_station_index(&self, index: usize) -> RadioResult<PlaybackState> {
        let mut selector = self.selector.lock().await;
        let address = selector.select_index(index)?.stream_address.clone();
        Ok(self.controller.select_station(&address).await)
    }

    /// The station table with the index of the current selection.
    pub async fn stations(&self) -> (Vec<Station>, usize) {
        let selector = self.selector.lock().await;
        (selector.stations().to_vec(), selector.selected_index())
    }

    /// The currently selected station.
    pub async fn selected_station(&self) -> Station {
        self.selector.lock().await.selected().clone()
    }

    /// Starts or stops playback.
    pub async fn toggle_playback(&self) -> PlaybackState {
        self.controller.toggle_playback().await
    }

    /// Sets the output volume; returns the volume applied.
    pub async fn set_volume(&self, volume: f32) -> RadioResult<f32> {
        self.controller.set_volume(volume).await
    }

    /// Starts (or restarts) the sleep timer.
    pub fn start_timer(&self, minutes: u32) -> RadioResult<TimerState> {
        self.sleep_timer.start(minutes)
    }

    /// Cancels the sleep timer. Returns `false` if none was running.
    pub fn cancel_timer(&self) -> bool {
        self.sleep_timer.cancel()
    }

    /// Snapshot of playback.
    pub fn playback(&self) -> PlaybackState {
        self.controller.state()
    }

    /// Snapshot of the sleep timer.
    pub fn timer(&self) -> TimerState {
        self.sleep_timer.status()
    }

    /// Snapshot of the clock.
    pub fn clock_state(&self) -> ClockState {
        self.clock.state()
    }

    /// Initiates graceful shutdown of all services.
    pub async fn shutdown(&self) {
        log::info!("[Bootstrap] Beginning graceful shutdown...");

        // Signal cancellation to all background tasks
        self.cancel_token.cancel();

        self.sleep_timer.shutdown();
        self.clock.stop();
        self.controller.release().await;

        log::info!("[Bootstrap] Shutdown complete");
    }
}

/// Bootstraps the player over the built-in station table.
///
/// # Errors
///
/// Returns [`RadioError::Configuration`](crate::error::RadioError) if the
/// configuration does not validate.
pub fn bootstrap_player(
    config: &PlayerConfig,
    output: Box<dyn AudioOutput>,
) -> RadioResult<PlayerServices> {
    bootstrap_player_with_stations(config, default_stations(), output)
}

/// Bootstraps the player over a custom station table.
///
/// Services are created in dependency order:
///
/// 1. Shared infrastructure (spawner, event bridge, cancellation token)
/// 2. Station selector (validates the table and initial index)
/// 3. Playback controller (owns `output`)
/// 4. Sleep timer (targets the controller)
/// 5. Clock display
///
/// Must be called inside a Tokio runtime. Nothing plays until
/// [`PlayerServices::initialize`].
///
/// # Errors
///
/// Returns [`RadioError::Configuration`](crate::error::RadioError) for an
/// empty table or a configuration that does not validate against it.
pub fn bootstrap_player_with_stations(
    config: &PlayerConfig,
    stations: Vec<Station>,
    output: Box<dyn AudioOutput>,
) -> RadioResult<PlayerServices> {
    let spawner = TokioSpawner::current();
    let event_bridge = Arc::new(BroadcastEventBridge::new(EVENT_CHANNEL_CAPACITY));
    let cancel_token = CancellationToken::new();

    let mut selector = StationSelector::new(stations)?;
    config.validate(selector.stations().len())?;
    let initial = selector
        .select_index(config.initial_station)?
        .stream_address
        .clone();

    let controller = Arc::new(PlaybackController::new(
        output,
        initial,
        config.initial_volume,
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
    ));

    let sleep_timer = Arc::new(SleepTimer::new(
        Arc::clone(&controller) as Arc<dyn ExpiryTarget>,
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
        spawner.clone(),
        cancel_token.clone(),
        config.tick_interval(),
    ));

    let clock = Arc::new(ClockDisplay::new(
        Arc::clone(&event_bridge) as Arc<dyn EventEmitter>,
        config.tick_interval(),
    ));

    log::info!(
        "[Bootstrap] Player ready with {} station(s), initial {}",
        selector.stations().len(),
        selector.selected().display_name
    );

    Ok(PlayerServices {
        selector: Mutex::new(selector),
        controller,
        sleep_timer,
        clock,
        event_bridge,
        spawner,
        cancel_token,
        config: config.clone(),
    })
}
