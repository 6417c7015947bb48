//! Bridge implementation that maps player events to broadcast transport.
//!
//! The [`BroadcastEventBridge`] sits between the player services and whatever
//! renders the readouts, mapping typed events onto one broadcast channel.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;

use super::emitter::EventEmitter;
use super::{ClockEvent, PlaybackEvent, PlayerEvent, TimerEvent};

/// Bridges player events to a `tokio::sync::broadcast` channel.
///
/// Front ends subscribe to the channel; an optional external emitter (for
/// example [`LoggingEventEmitter`](super::LoggingEventEmitter)) receives a
/// copy of every event first.
#[derive(Clone)]
pub struct BroadcastEventBridge {
    tx: broadcast::Sender<PlayerEvent>,
    external_emitter: Arc<RwLock<Option<Arc<dyn EventEmitter>>>>,
}

impl BroadcastEventBridge {
    /// Creates a new bridge with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self::with_sender(tx)
    }

    /// Creates a new bridge wrapping an existing broadcast sender.
    pub fn with_sender(tx: broadcast::Sender<PlayerEvent>) -> Self {
        Self {
            tx,
            external_emitter: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets an external emitter that receives every event before broadcast.
    pub fn set_external_emitter(&self, emitter: Arc<dyn EventEmitter>) {
        *self.external_emitter.write() = Some(emitter);
    }

    /// Returns a new receiver for the broadcast channel.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Returns a stream of events for a new subscriber.
    ///
    /// A subscriber that falls behind skips the events it missed; lag is
    /// logged, never surfaced.
    pub fn event_stream(&self) -> impl Stream<Item = PlayerEvent> + Send + 'static {
        BroadcastStream::new(self.tx.subscribe()).filter_map(|res| async move {
            match res {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(n)) => {
                    log::debug!("[EventBridge] Subscriber lagged, skipped {} event(s)", n);
                    None
                }
            }
        })
    }

    /// Returns a reference to the broadcast sender.
    pub fn sender(&self) -> &broadcast::Sender<PlayerEvent> {
        &self.tx
    }
}

/// Generates an [`EventEmitter`] method that forwards to the external emitter
/// (if set) and then sends to the broadcast channel.
macro_rules! impl_emit {
    ($method:ident, $event_ty:ty, $variant:ident) => {
        fn $method(&self, event: $event_ty) {
            if let Some(ref emitter) = *self.external_emitter.read() {
                emitter.$method(event.clone());
            }
            if let Err(e) = self.tx.send(PlayerEvent::$variant(event)) {
                log::trace!("[EventBridge] No broadcast receivers: {}", e);
            }
        }
    };
}

impl EventEmitter for BroadcastEventBridge {
    impl_emit!(emit_playback, PlaybackEvent, Playback);
    impl_emit!(emit_timer, TimerEvent, Timer);
    impl_emit!(emit_clock, ClockEvent, Clock);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmitter(AtomicUsize);

    impl EventEmitter for CountingEmitter {
        fn emit_playback(&self, _event: PlaybackEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn emit_timer(&self, _event: TimerEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn emit_clock(&self, _event: ClockEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn subscribers_receive_wrapped_events() {
        let bridge = BroadcastEventBridge::new(8);
        let mut rx = bridge.subscribe();

        bridge.emit_timer(TimerEvent::Tick {
            remaining_millis: 3000,
        });

        assert_eq!(
            rx.try_recv().unwrap(),
            PlayerEvent::Timer(TimerEvent::Tick {
                remaining_millis: 3000
            })
        );
    }

    #[tokio::test]
    async fn event_stream_skips_lagged_events() {
        let bridge = BroadcastEventBridge::new(2);
        let events = bridge.event_stream();

        for remaining_millis in [4000, 3000, 2000] {
            bridge.emit_timer(TimerEvent::Tick { remaining_millis });
        }
        drop(bridge);

        let received: Vec<_> = events.collect().await;
        assert_eq!(
            received,
            vec![
                PlayerEvent::Timer(TimerEvent::Tick {
                    remaining_millis: 3000
                }),
                PlayerEvent::Timer(TimerEvent::Tick {
                    remaining_millis: 2000
                }),
            ]
        );
    }

    #[test]
    fn emitting_without_subscribers_is_harmless() {
        let bridge = BroadcastEventBridge::new(8);
        bridge.emit_timer(TimerEvent::Expired { timestamp: 1 });
    }

    #[test]
    fn external_emitter_sees_every_event() {
        let bridge = BroadcastEventBridge::new(8);
        let external = Arc::new(CountingEmitter(AtomicUsize::new(0)));
        bridge.set_external_emitter(external.clone());

        bridge.emit_playback(PlaybackEvent::VolumeChanged {
            volume: 1.0,
            timestamp: 0,
        });
        bridge.emit_clock(ClockEvent::Tick {
            time: "12:00:00".into(),
            timestamp: 0,
        });

        assert_eq!(external.0.load(Ordering::SeqCst), 2);
    }
}
