//! Core state and configuration types.
//!
//! [`PlayerConfig`] is the validated configuration handed to
//! [`bootstrap_player`](crate::bootstrap::bootstrap_player). The snapshot
//! types ([`PlaybackState`], [`TimerState`], [`ClockState`]) are what front
//! ends read to draw their readouts; each is owned by exactly one service.

use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_VOLUME, TICK_INTERVAL_MS};
use crate::error::{RadioError, RadioResult};

/// Configuration for the player services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume applied before the first stream starts (`[0, 1]`).
    pub initial_volume: f32,

    /// Index of the station selected at start-up.
    pub initial_station: usize,

    /// Start playing the initial station as soon as the player comes up.
    pub autoplay: bool,

    /// Interval between countdown and clock ticks (milliseconds).
    pub tick_interval_ms: u64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            initial_volume: DEFAULT_VOLUME,
            initial_station: 0,
            autoplay: true,
            tick_interval_ms: TICK_INTERVAL_MS,
        }
    }
}

impl PlayerConfig {
    /// Validates the configuration values against a table of `station_count`
    /// stations.
    ///
    /// # Errors
    ///
    /// Returns [`RadioError::Configuration`] describing the first bad value.
    pub fn validate(&self, station_count: usize) -> RadioResult<()> {
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(RadioError::Configuration(format!(
                "initial_volume must be within 0..=1 (got {})",
                self.initial_volume
            )));
        }
        if self.initial_station >= station_count {
            return Err(RadioError::Configuration(format!(
                "initial_station {} is out of range ({} stations)",
                self.initial_station, station_count
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(RadioError::Configuration(
                "tick_interval_ms must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The tick interval as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Snapshot of the playback controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// The one stream address that is current.
    pub current_stream_address: String,
    /// Whether the host reported a successful start and nothing stopped it since.
    pub is_playing: bool,
    /// Output volume in `[0, 1]`.
    pub volume: f32,
    /// Notice for the error readout (stream failure or timer expiry).
    pub last_error: Option<String>,
}

/// Snapshot of the sleep timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    /// Whether a countdown is running.
    pub is_active: bool,
    /// Milliseconds left; zero while inactive.
    pub remaining_millis: u64,
    /// The minutes the user entered for the latest countdown.
    pub requested_minutes: Option<u32>,
}

impl TimerState {
    /// The inactive state.
    pub const INACTIVE: Self = Self {
        is_active: false,
        remaining_millis: 0,
        requested_minutes: None,
    };

    /// Whether the remaining-time readout should be shown.
    pub fn shows_countdown(&self) -> bool {
        self.is_active && self.remaining_millis > 0
    }
}

/// Snapshot of the clock readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClockState {
    /// Time of the latest tick; `None` before the first one.
    pub now: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(PlayerConfig::default().validate(3).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let config = PlayerConfig {
            initial_volume: 1.5,
            ..Default::default()
        };
        assert!(config.validate(3).is_err());

        let config = PlayerConfig {
            initial_station: 3,
            ..Default::default()
        };
        assert!(config.validate(3).is_err());

        let config = PlayerConfig {
            tick_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate(3).is_err());
    }

    #[test]
    fn nan_volume_is_rejected() {
        let config = PlayerConfig {
            initial_volume: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate(3).is_err());
    }

    #[test]
    fn countdown_readout_hidden_at_zero() {
        let state = TimerState {
            is_active: true,
            remaining_millis: 0,
            requested_minutes: Some(1),
        };
        assert!(!state.shows_countdown());
        assert!(!TimerState::INACTIVE.shows_countdown());
    }
}
