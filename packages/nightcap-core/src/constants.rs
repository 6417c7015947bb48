//! Fixed constants shared by the player services.
//!
//! Timing values here define the user-visible cadence of the countdown and the
//! clock readout; notices are the exact strings shown in the error readout.

// ─────────────────────────────────────────────────────────────────────────────
// Timing
// ─────────────────────────────────────────────────────────────────────────────

/// Interval between sleep timer and clock ticks (milliseconds).
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Amount subtracted from the countdown on every tick (milliseconds).
///
/// Always one second of countdown per tick, independent of the configured
/// tick interval, so tests can drive the timer faster than wall time.
pub const TICK_DECREMENT_MS: u64 = 1000;

/// Milliseconds in one minute of sleep timer duration.
pub const MILLIS_PER_MINUTE: u64 = 60 * 1000;

/// Upper bound for a sleep timer request (one day).
pub const MAX_TIMER_MINUTES: u32 = 24 * 60;

/// Grace period after spawning a player process during which an exit is
/// treated as a failed stream start (milliseconds).
pub const DEFAULT_STARTUP_GRACE_MS: u64 = 1500;

/// Timeout for the HTTP stream preflight request (seconds).
pub const PREFLIGHT_TIMEOUT_SECS: u64 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Volume
// ─────────────────────────────────────────────────────────────────────────────

/// Initial output volume (50%).
pub const DEFAULT_VOLUME: f32 = 0.5;

/// Smallest volume step offered by the volume control.
pub const VOLUME_STEP: f32 = 0.01;

// ─────────────────────────────────────────────────────────────────────────────
// User-facing notices
// ─────────────────────────────────────────────────────────────────────────────

/// Shown when the host audio layer fails to start a stream.
pub const STREAM_FAILURE_NOTICE: &str = "⚠ Failed to start the stream";

/// Shown when the sleep timer stops playback.
pub const TIMER_EXPIRY_NOTICE: &str = "⚠ The radio has stopped automatically due to timer.";

// ─────────────────────────────────────────────────────────────────────────────
// Channels
// ─────────────────────────────────────────────────────────────────────────────

/// Capacity of the broadcast channel for player events.
///
/// Clock and countdown ticks arrive once per second, so a slow console can
/// fall a minute behind before events are dropped.
pub const EVENT_CHANNEL_CAPACITY: usize = 128;
