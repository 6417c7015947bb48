//! Nightcap Core - player services for the Nightcap internet radio.
//!
//! This crate holds everything behind the player's readouts: the station
//! table, the playback controller that drives the host audio layer, the sleep
//! timer that stops playback, and the clock. Front ends (the `nightcap`
//! console app) call into [`PlayerServices`] and listen on its event bridge.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`runtime`]: Task spawning and owned scheduled tasks
//! - [`events`]: Event system for readout updates
//! - [`audio`]: Host audio layer abstraction and the process-backed output
//! - [`station`]: Station table and selection
//! - [`services`]: Playback controller, sleep timer and clock
//! - [`state`]: Configuration and state snapshots
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! - [`TaskSpawner`](runtime::TaskSpawner): Spawning background tasks
//! - [`EventEmitter`](events::EventEmitter): Emitting domain events
//! - [`AudioOutput`](audio::AudioOutput): Loading, starting and stopping streams
//! - [`ExpiryTarget`](services::ExpiryTarget): Reacting to sleep timer expiry

#![warn(clippy::all)]

pub mod audio;
pub mod bootstrap;
pub mod constants;
pub mod error;
pub mod events;
pub mod runtime;
pub mod services;
pub mod state;
pub mod station;
pub mod utils;

// Re-export commonly used types at the crate root
pub use error::{ErrorCode, RadioError, RadioResult, StreamError, StreamResult};
pub use events::{
    BroadcastEventBridge, ClockEvent, EventEmitter, LoggingEventEmitter, NoopEventEmitter,
    PlaybackEvent, PlayerEvent, StopReason, TimerEvent,
};
pub use runtime::{ScheduledTask, TaskSpawner, TokioSpawner};
pub use state::{ClockState, PlaybackState, PlayerConfig, TimerState};
pub use station::{default_stations, Station, StationSelector};
pub use utils::{format_clock, now_millis, parse_timer_minutes, remaining_seconds};

// Re-export audio types
pub use audio::{AudioOutput, PlayerCommand, ProcessOutput, StreamInfo, StreamProbe};

// Re-export service types
pub use services::{Clock, ClockDisplay, ExpiryTarget, PlaybackController, SleepTimer};

// Re-export bootstrap types
pub use bootstrap::{bootstrap_player, bootstrap_player_with_stations, PlayerServices};
