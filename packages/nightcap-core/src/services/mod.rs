//! Player services layer.
//!
//! Each service owns one piece of user-visible state: the controller owns
//! playback, the sleep timer owns the countdown and the clock owns the
//! time readout. Wiring happens in [`bootstrap`](crate::bootstrap).

pub mod clock;
pub mod playback_controller;
pub mod sleep_timer;

pub use clock::{Clock, ClockDisplay};
pub use playback_controller::PlaybackController;
pub use sleep_timer::{ExpiryTarget, SleepTimer};
