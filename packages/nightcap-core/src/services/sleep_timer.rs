//! Sleep timer.
//!
//! A countdown with two states, inactive and active. Each started countdown
//! runs as one [`ScheduledTask`] that ticks once per interval and removes one
//! second from the remaining time. When the remaining time reaches zero the
//! timer goes inactive and notifies its [`ExpiryTarget`] exactly once.
//!
//! Every countdown carries a generation number. Starting or cancelling bumps
//! the generation, so a tick from a superseded countdown that was already in
//! flight finds a mismatch and exits without touching state.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

use crate::constants::{MILLIS_PER_MINUTE, TICK_DECREMENT_MS};
use crate::error::{RadioError, RadioResult};
use crate::events::{EventEmitter, TimerEvent};
use crate::runtime::{ScheduledTask, TokioSpawner};
use crate::state::TimerState;
use crate::utils::{now_millis, validate_timer_minutes};

/// Receiver of sleep timer expiry.
#[async_trait]
pub trait ExpiryTarget: Send + Sync {
    /// Called once when a countdown reaches zero.
    async fn on_timer_expired(&self);
}

#[derive(Default)]
struct TimerInner {
    active: bool,
    remaining_millis: u64,
    requested_minutes: Option<u32>,
    generation: u64,
    task: Option<ScheduledTask>,
}

impl TimerInner {
    fn snapshot(&self) -> TimerState {
        TimerState {
            is_active: self.active,
            remaining_millis: self.remaining_millis,
            requested_minutes: self.requested_minutes,
        }
    }

    /// Moves to inactive and invalidates any running countdown.
    fn deactivate(&mut self) {
        self.generation += 1;
        self.active = false;
        self.remaining_millis = 0;
        if let Some(task) = self.task.take() {
            task.cancel();
        }
    }
}

enum Countdown {
    Tick(u64),
    Expired,
    Superseded,
}

/// Countdown that stops playback when it runs out.
pub struct SleepTimer {
    inner: Arc<Mutex<TimerInner>>,
    target: Arc<dyn ExpiryTarget>,
    emitter: Arc<dyn EventEmitter>,
    spawner: TokioSpawner,
    cancel_token: CancellationToken,
    tick_interval: Duration,
}

impl SleepTimer {
    /// Creates an inactive timer.
    ///
    /// Countdowns are scheduled under `cancel_token`; cancelling it stops any
    /// running countdown without firing expiry.
    pub fn new(
        target: Arc<dyn ExpiryTarget>,
        emitter: Arc<dyn EventEmitter>,
        spawner: TokioSpawner,
        cancel_token: CancellationToken,
        tick_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(TimerInner::default())),
            target,
            emitter,
            spawner,
            cancel_token,
            tick_interval,
        }
    }

    /// Returns a snapshot of the timer.
    pub fn status(&self) -> TimerState {
        self.inner.lock().snapshot()
    }

    /// Starts a countdown of `minutes`, replacing any running one.
    ///
    /// The replaced countdown never fires.
    ///
    /// # Errors
    ///
    /// Returns [`RadioError::InvalidDuration`] for zero or oversized
    /// durations (the running countdown, if any, is left untouched), and
    /// [`RadioError::Internal`] after shutdown.
    pub fn start(&self, minutes: u32) -> RadioResult<TimerState> {
        let minutes = validate_timer_minutes(minutes)?;
        if self.cancel_token.is_cancelled() {
            return Err(RadioError::Internal("player is shutting down".into()));
        }

        let remaining_millis = u64::from(minutes) * MILLIS_PER_MINUTE;

        let snapshot = {
            let mut inner = self.inner.lock();
            if inner.active {
                log::info!(
                    "[SleepTimer] Replacing countdown with {}ms left",
                    inner.remaining_millis
                );
            }
            inner.deactivate();

            let generation = inner.generation;
            inner.active = true;
            inner.remaining_millis = remaining_millis;
            inner.requested_minutes = Some(minutes);

            let state = Arc::clone(&self.inner);
            let target = Arc::clone(&self.target);
            let emitter = Arc::clone(&self.emitter);
            let period = self.tick_interval;
            inner.task = Some(ScheduledTask::spawn(
                &self.spawner,
                &self.cancel_token,
                move |token| run_countdown(state, target, emitter, period, generation, token),
            ));
            inner.snapshot()
        };

        log::info!("[SleepTimer] Started {} minute countdown", minutes);
        self.emitter.emit_timer(TimerEvent::Started {
            minutes,
            remaining_millis,
            timestamp: now_millis(),
        });
        Ok(snapshot)
    }

    /// Cancels the running countdown without firing expiry.
    ///
    /// Returns `false` if no countdown was running.
    pub fn cancel(&self) -> bool {
        let remaining_millis = {
            let mut inner = self.inner.lock();
            if !inner.active {
                return false;
            }
            let remaining = inner.remaining_millis;
            inner.deactivate();
            remaining
        };

        log::info!(
            "[SleepTimer] Cancelled with {}ms left",
            remaining_millis
        );
        self.emitter.emit_timer(TimerEvent::Cancelled {
            remaining_millis,
            timestamp: now_millis(),
        });
        true
    }

    /// Stops any countdown silently. Used on shutdown.
    pub fn shutdown(&self) {
        self.inner.lock().deactivate();
    }
}

async fn run_countdown(
    state: Arc<Mutex<TimerInner>>,
    target: Arc<dyn ExpiryTarget>,
    emitter: Arc<dyn EventEmitter>,
    period: Duration,
    generation: u64,
    token: CancellationToken,
) {
    // First tick one full period after the start, never immediately.
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = ticker.tick() => {}
        }

        let step = {
            let mut inner = state.lock();
            if inner.generation != generation || !inner.active {
                Countdown::Superseded
            } else {
                inner.remaining_millis = inner.remaining_millis.saturating_sub(TICK_DECREMENT_MS);
                if inner.remaining_millis == 0 {
                    inner.active = false;
                    // Dropping our own handle only cancels the token we no
                    // longer select on.
                    inner.task = None;
                    Countdown::Expired
                } else {
                    Countdown::Tick(inner.remaining_millis)
                }
            }
        };

        match step {
            Countdown::Tick(remaining_millis) => {
                emitter.emit_timer(TimerEvent::Tick { remaining_millis });
            }
            Countdown::Expired => {
                log::info!("[SleepTimer] Countdown expired");
                target.on_timer_expired().await;
                emitter.emit_timer(TimerEvent::Expired {
                    timestamp: now_millis(),
                });
                return;
            }
            Countdown::Superseded => return,
        }
    }
}
