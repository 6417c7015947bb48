//! General utilities shared across the player.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone};

use crate::constants::{MAX_TIMER_MINUTES, VOLUME_STEP};
use crate::error::{RadioError, RadioResult};

// ─────────────────────────────────────────────────────────────────────────────
// Time Utilities
// ─────────────────────────────────────────────────────────────────────────────

/// Returns the current Unix timestamp in milliseconds.
///
/// Returns 0 if the system clock is before the Unix epoch.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Formats a timestamp for the current-time readout (`HH:MM:SS`).
#[must_use]
pub fn format_clock<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M:%S").to_string()
}

/// Whole seconds left in a countdown, rounded down.
#[must_use]
pub fn remaining_seconds(remaining_millis: u64) -> u64 {
    remaining_millis / 1000
}

// ─────────────────────────────────────────────────────────────────────────────
// Input Validation
// ─────────────────────────────────────────────────────────────────────────────

/// Clamps a requested volume into `[0, 1]` and snaps it to the nearest
/// [`VOLUME_STEP`].
///
/// # Errors
///
/// Returns [`RadioError::InvalidVolume`] for NaN, which has no position on
/// the slider.
pub fn clamp_volume(volume: f32) -> RadioResult<f32> {
    if volume.is_nan() {
        return Err(RadioError::InvalidVolume("NaN".into()));
    }
    let steps = (1.0 / VOLUME_STEP).round();
    Ok((volume.clamp(0.0, 1.0) * steps).round() / steps)
}

/// Validates a sleep timer duration in whole minutes.
///
/// # Errors
///
/// Returns [`RadioError::InvalidDuration`] for zero or for durations longer
/// than a day.
pub fn validate_timer_minutes(minutes: u32) -> RadioResult<u32> {
    if minutes == 0 {
        return Err(RadioError::InvalidDuration(
            "timer must be at least 1 minute".into(),
        ));
    }
    if minutes > MAX_TIMER_MINUTES {
        return Err(RadioError::InvalidDuration(format!(
            "timer cannot exceed {} minutes",
            MAX_TIMER_MINUTES
        )));
    }
    Ok(minutes)
}

/// Parses the minutes input field.
///
/// Accepts surrounding whitespace; rejects anything that is not a positive
/// whole number.
///
/// # Errors
///
/// Returns [`RadioError::InvalidDuration`] for non-numeric, negative, zero, or
/// oversized input.
pub fn parse_timer_minutes(input: &str) -> RadioResult<u32> {
    let trimmed = input.trim();
    let minutes: u32 = trimmed
        .parse()
        .map_err(|_| RadioError::InvalidDuration(format!("'{}' is not a number of minutes", trimmed)))?;
    validate_timer_minutes(minutes)
}
