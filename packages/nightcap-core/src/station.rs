//! Station table and selection.
//!
//! The station list is compiled in and immutable. [`StationSelector`] maps a
//! chosen entry to the stream address that is handed to the playback
//! controller; it performs no I/O itself.

use serde::Serialize;

use crate::error::{RadioError, RadioResult};

/// A selectable radio station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    /// Name shown in the station list.
    pub display_name: String,
    /// URI of the station's live audio feed.
    pub stream_address: String,
}

impl Station {
    /// Creates a station entry.
    pub fn new(display_name: impl Into<String>, stream_address: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            stream_address: stream_address.into(),
        }
    }
}

/// The compiled-in station table as `(display name, stream address)` pairs.
pub const DEFAULT_STATIONS: &[(&str, &str)] = &[
    ("Radio RMF FM", "http://195.150.20.242:8000/rmf_fm"),
    ("Radio Eska", "https://waw01-04.ic.smcdn.pl:8000/2720-1.aac"),
    (
        "Polskie Radio Program III (Trójka)",
        "http://stream3.polskieradio.pl:8904/",
    ),
];

/// Builds the compiled-in station list.
#[must_use]
pub fn default_stations() -> Vec<Station> {
    DEFAULT_STATIONS
        .iter()
        .map(|(name, address)| Station::new(*name, *address))
        .collect()
}

/// Holds the station list and the currently selected entry.
#[derive(Debug, Clone)]
pub struct StationSelector {
    stations: Vec<Station>,
    selected: usize,
}

impl StationSelector {
    /// Creates a selector over `stations` with the first entry selected.
    ///
    /// # Errors
    ///
    /// Returns [`RadioError::Configuration`] if the list is empty.
    pub fn new(stations: Vec<Station>) -> RadioResult<Self> {
        if stations.is_empty() {
            return Err(RadioError::Configuration(
                "station list cannot be empty".into(),
            ));
        }
        Ok(Self {
            stations,
            selected: 0,
        })
    }

    /// Creates a selector over the compiled-in station table.
    #[must_use]
    pub fn with_default_stations() -> Self {
        Self {
            stations: default_stations(),
            selected: 0,
        }
    }

    /// All stations in display order.
    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    /// The currently selected station.
    pub fn selected(&self) -> &Station {
        &self.stations[self.selected]
    }

    /// Index of the currently selected station.
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    /// Selects the station at `index` (zero-based).
    ///
    /// # Errors
    ///
    /// Returns [`RadioError::UnknownStation`] if `index` is out of range.
    pub fn select_index(&mut self, index: usize) -> RadioResult<&Station> {
        if index >= self.stations.len() {
            return Err(RadioError::UnknownStation(format!(
                "#{} (have {} stations)",
                index + 1,
                self.stations.len()
            )));
        }
        self.selected = index;
        Ok(&self.stations[index])
    }

    /// Selects the station whose stream address is `address`.
    ///
    /// # Errors
    ///
    /// Returns [`RadioError::UnknownStation`] if no configured station has
    /// that address.
    pub fn select_address(&mut self, address: &str) -> RadioResult<&Station> {
        let index = self
            .stations
            .iter()
            .position(|s| s.stream_address == address)
            .ok_or_else(|| RadioError::UnknownStation(address.to_string()))?;
        self.select_index(index)
    }
}
