//! Event emitter abstraction for decoupling services from presentation.
//!
//! Services depend on the [`EventEmitter`] trait rather than concrete broadcast
//! channels, enabling testing and alternative front ends.

use super::{ClockEvent, PlaybackEvent, TimerEvent};

/// Trait for emitting player events without knowledge of the front end.
///
/// # Example
///
/// ```ignore
/// struct MyService {
///     emitter: Arc<dyn EventEmitter>,
/// }
///
/// impl MyService {
///     fn do_something(&self) {
///         self.emitter.emit_timer(TimerEvent::Expired { timestamp: now_millis() });
///     }
/// }
/// ```
pub trait EventEmitter: Send + Sync {
    /// Emits a playback state event.
    fn emit_playback(&self, event: PlaybackEvent);

    /// Emits a sleep timer event.
    fn emit_timer(&self, event: TimerEvent);

    /// Emits a clock readout event.
    fn emit_clock(&self, event: ClockEvent);
}

/// No-op emitter for embedding or testing.
pub struct NoopEventEmitter;

impl EventEmitter for NoopEventEmitter {
    fn emit_playback(&self, _event: PlaybackEvent) {}

    fn emit_timer(&self, _event: TimerEvent) {}

    fn emit_clock(&self, _event: ClockEvent) {}
}

/// Logging emitter for debugging and development.
///
/// Logs playback and timer events at debug level and clock ticks at trace
/// level, since the latter arrive every second.
pub struct LoggingEventEmitter;

impl EventEmitter for LoggingEventEmitter {
    fn emit_playback(&self, event: PlaybackEvent) {
        tracing::debug!(?event, "playback_event");
    }

    fn emit_timer(&self, event: TimerEvent) {
        tracing::debug!(?event, "timer_event");
    }

    fn emit_clock(&self, event: ClockEvent) {
        tracing::trace!(?event, "clock_event");
    }
}
