//! Player configuration.
//!
//! Supports loading from YAML files with environment variable overrides.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use nightcap_core::constants::{DEFAULT_STARTUP_GRACE_MS, DEFAULT_VOLUME, TICK_INTERVAL_MS};
use nightcap_core::{PlayerCommand, PlayerConfig};
use serde::Deserialize;

/// Player configuration loaded from YAML with environment overrides.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Volume applied before the first stream starts (0.0 - 1.0).
    /// Override: `NIGHTCAP_VOLUME`
    pub volume: f32,

    /// Zero-based index of the station selected at start-up.
    /// Override: `NIGHTCAP_STATION`
    pub station: usize,

    /// Start playing the selected station immediately.
    /// Override: `NIGHTCAP_AUTOPLAY`
    pub autoplay: bool,

    /// External player command. Arguments may use `{url}`, `{volume}` and
    /// `{ipc}` placeholders.
    pub player: PlayerCommand,

    /// How long a freshly launched player must keep running to count as
    /// started (milliseconds).
    /// Override: `NIGHTCAP_STARTUP_GRACE_MS`
    pub startup_grace_ms: u64,

    /// Check each stream over HTTP before launching the player.
    /// Override: `NIGHTCAP_PREFLIGHT`
    pub preflight: bool,

    /// Interval between countdown and clock ticks (milliseconds).
    pub tick_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            volume: DEFAULT_VOLUME,
            station: 0,
            autoplay: true,
            player: PlayerCommand::default(),
            startup_grace_ms: DEFAULT_STARTUP_GRACE_MS,
            preflight: false,
            tick_interval_ms: TICK_INTERVAL_MS,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a YAML file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applies overrides looked up by variable name. Unparseable values are
    /// ignored.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(volume) = lookup("NIGHTCAP_VOLUME").and_then(|v| v.parse().ok()) {
            self.volume = volume;
        }

        if let Some(station) = lookup("NIGHTCAP_STATION").and_then(|v| v.parse().ok()) {
            self.station = station;
        }

        if let Some(autoplay) = lookup("NIGHTCAP_AUTOPLAY").and_then(|v| parse_flag(&v)) {
            self.autoplay = autoplay;
        }

        if let Some(grace) = lookup("NIGHTCAP_STARTUP_GRACE_MS").and_then(|v| v.parse().ok()) {
            self.startup_grace_ms = grace;
        }

        if let Some(preflight) = lookup("NIGHTCAP_PREFLIGHT").and_then(|v| parse_flag(&v)) {
            self.preflight = preflight;
        }

        // Note: NIGHTCAP_LOG_LEVEL is handled by clap via #[arg(env = ...)] in main.rs
    }

    /// Start-up grace period as a [`Duration`].
    pub fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }

    /// Converts to nightcap-core's PlayerConfig type.
    pub fn to_player_config(&self) -> PlayerConfig {
        PlayerConfig {
            initial_volume: self.volume,
            initial_station: self.station,
            autoplay: self.autoplay,
            tick_interval_ms: self.tick_interval_ms,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
