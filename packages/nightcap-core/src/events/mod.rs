//! Event system for real-time readout updates.
//!
//! This module provides:
//! - [`EventEmitter`] trait for player services to emit events
//! - [`BroadcastEventBridge`] for fan-out to front ends
//! - Event types for playback, the sleep timer, and the clock

mod bridge;
mod emitter;

pub use bridge::BroadcastEventBridge;
pub use emitter::{EventEmitter, LoggingEventEmitter, NoopEventEmitter};

use serde::Serialize;

/// Events broadcast to front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum PlayerEvent {
    /// Events from the playback controller.
    Playback(PlaybackEvent),

    /// Events from the sleep timer.
    Timer(TimerEvent),

    /// Wall-clock readout updates.
    Clock(ClockEvent),
}

/// Why playback stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// The user toggled playback off.
    User,
    /// The previous stream was torn down for a station change.
    StationChange,
    /// The sleep timer expired.
    Timer,
    /// The player is shutting down.
    Shutdown,
}

/// Events related to playback state changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// A new stream address became current.
    #[serde(rename_all = "camelCase")]
    StationChanged {
        /// The newly loaded stream address.
        stream_address: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The host audio layer started the stream.
    #[serde(rename_all = "camelCase")]
    Started {
        /// The stream address now playing.
        stream_address: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// Playback stopped.
    #[serde(rename_all = "camelCase")]
    Stopped {
        /// The stream address that was playing.
        stream_address: String,
        /// What stopped it.
        reason: StopReason,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The host audio layer failed to start the stream.
    #[serde(rename_all = "camelCase")]
    Failed {
        /// The stream address that failed.
        stream_address: String,
        /// User-facing failure message.
        message: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// Output volume changed.
    VolumeChanged {
        /// New volume in `[0, 1]`.
        volume: f32,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

/// Events related to the sleep timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TimerEvent {
    /// A countdown started (replacing any previous one).
    #[serde(rename_all = "camelCase")]
    Started {
        /// Duration requested by the user.
        minutes: u32,
        /// Countdown length in milliseconds.
        remaining_millis: u64,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// One tick of the countdown elapsed.
    #[serde(rename_all = "camelCase")]
    Tick {
        /// Milliseconds left after this tick.
        remaining_millis: u64,
    },
    /// The user cancelled the countdown.
    #[serde(rename_all = "camelCase")]
    Cancelled {
        /// Milliseconds that were left.
        remaining_millis: u64,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
    /// The countdown reached zero and playback was stopped.
    Expired {
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

/// Wall-clock readout updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClockEvent {
    /// The clock advanced one second.
    Tick {
        /// Local time formatted for display (`HH:MM:SS`).
        time: String,
        /// Unix timestamp in milliseconds.
        timestamp: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_event_serializes_with_category_and_type() {
        let event = PlayerEvent::Playback(PlaybackEvent::Failed {
            stream_address: "http://example.test/live".into(),
            message: "⚠ Failed to start the stream".into(),
            timestamp: 7,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["category"], "playback");
        assert_eq!(json["type"], "failed");
        assert_eq!(json["streamAddress"], "http://example.test/live");
    }

    #[test]
    fn timer_event_uses_camel_case_fields() {
        let json = serde_json::to_value(PlayerEvent::Timer(TimerEvent::Tick {
            remaining_millis: 59_000,
        }))
        .unwrap();
        assert_eq!(json["category"], "timer");
        assert_eq!(json["remainingMillis"], 59_000);
    }

    #[test]
    fn stop_reason_serializes_camel_case() {
        let json = serde_json::to_value(StopReason::StationChange).unwrap();
        assert_eq!(json, "stationChange");
    }
}
