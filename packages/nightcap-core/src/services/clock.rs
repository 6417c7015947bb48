//! Wall-clock readout.
//!
//! [`Clock::ticks`] consumes the clock and yields the local time once per
//! interval, starting immediately. [`ClockDisplay`] runs that stream as a
//! scheduled task, keeps the latest value for the readout and emits a
//! [`ClockEvent`] per tick. The clock has no link to playback or the timer.

use std::sync::Arc;
use std::time::Duration;

use async_stream::stream;
use chrono::{DateTime, Local};
use futures::{Stream, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::events::{ClockEvent, EventEmitter};
use crate::runtime::{ScheduledTask, TaskSpawner};
use crate::state::ClockState;
use crate::utils::{format_clock, now_millis};

/// Source of once-per-interval local timestamps.
pub struct Clock {
    period: Duration,
}

impl Clock {
    /// Creates a clock ticking every `period`.
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Turns the clock into an infinite stream of timestamps.
    ///
    /// The first timestamp is yielded immediately. Nothing runs until the
    /// stream is polled, and a consumed clock cannot be restarted.
    pub fn ticks(self) -> impl Stream<Item = DateTime<Local>> + Send + 'static {
        let period = self.period;
        stream! {
            let mut ticker = interval(period);
            // Missed ticks are skipped, not replayed.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                yield Local::now();
            }
        }
    }
}

/// Keeps the current-time readout up to date.
pub struct ClockDisplay {
    latest: Arc<RwLock<ClockState>>,
    task: Mutex<Option<ScheduledTask>>,
    emitter: Arc<dyn EventEmitter>,
    period: Duration,
}

impl ClockDisplay {
    /// Creates a stopped display.
    pub fn new(emitter: Arc<dyn EventEmitter>, period: Duration) -> Self {
        Self {
            latest: Arc::new(RwLock::new(ClockState::default())),
            task: Mutex::new(None),
            emitter,
            period,
        }
    }

    /// The latest clock reading.
    pub fn state(&self) -> ClockState {
        *self.latest.read()
    }

    /// Whether the refresh task is running.
    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .map(|t| !t.is_cancelled())
            .unwrap_or(false)
    }

    /// Starts refreshing with a fresh [`Clock`]. A running refresh is replaced.
    pub fn start<S: TaskSpawner + ?Sized>(&self, spawner: &S, parent: &CancellationToken) {
        let latest = Arc::clone(&self.latest);
        let emitter = Arc::clone(&self.emitter);
        let ticks = Clock::new(self.period).ticks();

        let task = ScheduledTask::spawn(spawner, parent, move |token| async move {
            let mut ticks = Box::pin(ticks);
            loop {
                let now = tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    next = ticks.next() => match next {
                        Some(now) => now,
                        None => return,
                    },
                };
                latest.write().now = Some(now);
                emitter.emit_clock(ClockEvent::Tick {
                    time: format_clock(&now),
                    timestamp: now_millis(),
                });
            }
        });

        *self.task.lock() = Some(task);
    }

    /// Stops refreshing.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::events::{PlaybackEvent, TimerEvent};
    use crate::runtime::TokioSpawner;

    struct CountingEmitter(AtomicUsize);

    impl EventEmitter for CountingEmitter {
        fn emit_playback(&self, _event: PlaybackEvent) {}
        fn emit_timer(&self, _event: TimerEvent) {}
        fn emit_clock(&self, _event: ClockEvent) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_starting_immediately() {
        let start = tokio::time::Instant::now();
        let stamps: Vec<_> = Clock::new(Duration::from_secs(1))
            .ticks()
            .take(3)
            .collect()
            .await;

        assert_eq!(stamps.len(), 3);
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2) && elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn stream_is_lazy_until_polled() {
        let ticks = Clock::new(Duration::from_secs(1)).ticks();
        tokio::time::sleep(Duration::from_secs(5)).await;

        let start = tokio::time::Instant::now();
        let first: Vec<_> = ticks.take(1).collect().await;
        assert_eq!(first.len(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn display_updates_until_stopped() {
        let emitter = Arc::new(CountingEmitter(AtomicUsize::new(0)));
        let display = ClockDisplay::new(emitter.clone(), Duration::from_secs(1));
        let parent = CancellationToken::new();
        assert!(display.state().now.is_none());

        display.start(&TokioSpawner::current(), &parent);
        tokio::time::sleep(Duration::from_millis(2_500)).await;

        assert_eq!(emitter.0.load(Ordering::SeqCst), 3);
        assert!(display.state().now.is_some());
        assert!(display.is_running());

        display.stop();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(emitter.0.load(Ordering::SeqCst), 3);
        assert!(!display.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_display() {
        let emitter = Arc::new(CountingEmitter(AtomicUsize::new(0)));
        let display = ClockDisplay::new(emitter.clone(), Duration::from_secs(1));
        let parent = CancellationToken::new();

        display.start(&TokioSpawner::current(), &parent);
        tokio::time::sleep(Duration::from_millis(500)).await;
        parent.cancel();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(emitter.0.load(Ordering::SeqCst), 1);
        assert!(!display.is_running());
    }
}
