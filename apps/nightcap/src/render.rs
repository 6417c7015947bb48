//! Text readouts for the console.

use nightcap_core::events::{ClockEvent, PlaybackEvent, PlayerEvent, StopReason, TimerEvent};
use nightcap_core::constants::TIMER_EXPIRY_NOTICE;
use nightcap_core::{
    format_clock, remaining_seconds, ClockState, PlaybackState, Station, StreamInfo, TimerState,
};

/// Station list with the selection marked.
pub fn stations(stations: &[Station], selected: usize) -> String {
    stations
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let marker = if i == selected { '>' } else { ' ' };
            format!("{} {}. {}  {}", marker, i + 1, s.display_name, s.stream_address)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Playback line followed by the error readout, if any.
pub fn playback(state: &PlaybackState, station: &str) -> String {
    let status = if state.is_playing { "Playing" } else { "Stopped" };
    let mut out = format!(
        "{}: {} (volume {}%)",
        status,
        station,
        (state.volume * 100.0).round() as u32
    );
    if let Some(error) = &state.last_error {
        out.push('\n');
        out.push_str(error);
    }
    out
}

/// Remaining-time readout; shown only while a countdown is running.
pub fn timer(state: &TimerState) -> Option<String> {
    state
        .shows_countdown()
        .then(|| format!("Time remaining: {} seconds", remaining_seconds(state.remaining_millis)))
}

/// Current-time readout.
pub fn clock(state: &ClockState) -> Option<String> {
    state
        .now
        .map(|now| format!("Current Time: {}", format_clock(&now)))
}

/// Stream details from a preflight request.
pub fn stream_info(info: &StreamInfo) -> String {
    let field = |value: Option<&str>| value.unwrap_or("unknown").to_string();
    format!(
        "Name: {}\nGenre: {}\nBitrate: {}\nContent type: {}",
        field(info.name.as_deref()),
        field(info.genre.as_deref()),
        info.bitrate_kbps
            .map(|b| format!("{} kbit/s", b))
            .unwrap_or_else(|| "unknown".to_string()),
        field(info.content_type.as_deref()),
    )
}

/// Live notice for an event, or `None` for events that only refresh state.
///
/// Countdown ticks are announced on whole minutes and during the last ten
/// seconds; clock ticks are never announced.
pub fn event(event: &PlayerEvent) -> Option<String> {
    match event {
        PlayerEvent::Playback(PlaybackEvent::Started { stream_address, .. }) => {
            Some(format!("Playing {}", stream_address))
        }
        PlayerEvent::Playback(PlaybackEvent::Failed { message, .. }) => Some(message.clone()),
        PlayerEvent::Playback(PlaybackEvent::Stopped {
            reason: StopReason::User,
            ..
        }) => Some("Stopped".to_string()),
        PlayerEvent::Playback(PlaybackEvent::Stopped {
            reason: StopReason::Timer,
            ..
        }) => Some(TIMER_EXPIRY_NOTICE.to_string()),
        PlayerEvent::Playback(PlaybackEvent::VolumeChanged { volume, .. }) => {
            Some(format!("Volume {}%", (volume * 100.0).round() as u32))
        }
        PlayerEvent::Playback(_) => None,
        PlayerEvent::Timer(TimerEvent::Started { minutes, .. }) => {
            Some(format!("Sleep timer set for {} minute(s)", minutes))
        }
        PlayerEvent::Timer(TimerEvent::Tick { remaining_millis }) => {
            let seconds = remaining_seconds(*remaining_millis);
            (seconds <= 10 || seconds % 60 == 0)
                .then(|| format!("Time remaining: {} seconds", seconds))
        }
        PlayerEvent::Timer(TimerEvent::Cancelled { .. }) => {
            Some("Sleep timer cancelled".to_string())
        }
        // Announced through the timer stop above.
        PlayerEvent::Timer(TimerEvent::Expired { .. }) => None,
        PlayerEvent::Clock(ClockEvent::Tick { .. }) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use nightcap_core::constants::STREAM_FAILURE_NOTICE;

    fn state(is_playing: bool, last_error: Option<&str>) -> PlaybackState {
        PlaybackState {
            current_stream_address: "u1".into(),
            is_playing,
            volume: 0.5,
            last_error: last_error.map(str::to_string),
        }
    }

    #[test]
    fn marks_selected_station() {
        let list = stations(
            &[Station::new("Radio A", "u1"), Station::new("Radio B", "u2")],
            1,
        );
        assert_eq!(list, "  1. Radio A  u1\n> 2. Radio B  u2");
    }

    #[test]
    fn playback_shows_error_readout() {
        assert_eq!(playback(&state(true, None), "Radio A"), "Playing: Radio A (volume 50%)");
        assert_eq!(
            playback(&state(false, Some(STREAM_FAILURE_NOTICE)), "Radio A"),
            format!("Stopped: Radio A (volume 50%)\n{}", STREAM_FAILURE_NOTICE)
        );
    }

    #[test]
    fn timer_readout_only_while_counting() {
        let running = TimerState {
            is_active: true,
            remaining_millis: 59_000,
            requested_minutes: Some(1),
        };
        assert_eq!(timer(&running).as_deref(), Some("Time remaining: 59 seconds"));
        assert_eq!(timer(&TimerState::INACTIVE), None);
    }

    #[test]
    fn clock_readout_formats_local_time() {
        let now = Local.with_ymd_and_hms(2024, 5, 1, 7, 8, 9).single();
        assert_eq!(
            clock(&ClockState { now }).as_deref(),
            now.map(|_| "Current Time: 07:08:09")
        );
        assert_eq!(clock(&ClockState::default()), None);
    }

    #[test]
    fn countdown_ticks_are_throttled() {
        let tick = |ms| event(&PlayerEvent::Timer(TimerEvent::Tick { remaining_millis: ms }));
        assert!(tick(120_000).is_some());
        assert!(tick(119_000).is_none());
        assert_eq!(tick(5_000).as_deref(), Some("Time remaining: 5 seconds"));
    }

    #[test]
    fn timer_stop_shows_expiry_notice() {
        let stopped = PlayerEvent::Playback(PlaybackEvent::Stopped {
            stream_address: "u1".into(),
            reason: StopReason::Timer,
            timestamp: 0,
        });
        assert_eq!(event(&stopped).as_deref(), Some(TIMER_EXPIRY_NOTICE));
        assert_eq!(event(&PlayerEvent::Timer(TimerEvent::Expired { timestamp: 0 })), None);
    }

    #[test]
    fn stream_info_fills_unknowns() {
        let info = StreamInfo {
            name: Some("RMF FM".into()),
            bitrate_kbps: Some(128),
            ..Default::default()
        };
        assert_eq!(
            stream_info(&info),
            "Name: RMF FM\nGenre: unknown\nBitrate: 128 kbit/s\nContent type: unknown"
        );
    }
}
