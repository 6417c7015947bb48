//! Centralized error types for the Nightcap core library.
//!
//! - [`StreamError`] is the single failure kind raised by the host audio layer
//!   when a stream cannot be started. The playback controller turns it into
//!   the `last_error` readout; it never propagates past that boundary.
//! - [`RadioError`] covers invalid requests and configuration problems raised
//!   to callers of the services.

use serde::Serialize;
use thiserror::Error;

use crate::constants::STREAM_FAILURE_NOTICE;

/// Trait for error types that provide machine-readable error codes.
pub trait ErrorCode {
    /// Returns a machine-readable error code.
    fn code(&self) -> &'static str;
}

/// A stream-start failure reported by the host audio layer.
///
/// `message` is what the user sees; `detail` carries the underlying cause for
/// the log and is never shown in the readout.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct StreamError {
    message: String,
    detail: Option<String>,
}

impl StreamError {
    /// Creates a stream error with the standard user-facing notice.
    pub fn failed_to_start(detail: impl Into<String>) -> Self {
        Self {
            message: STREAM_FAILURE_NOTICE.to_string(),
            detail: Some(detail.into()),
        }
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The underlying cause, if one was recorded.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl ErrorCode for StreamError {
    fn code(&self) -> &'static str {
        "stream_start_failed"
    }
}

/// Convenient Result alias for host audio layer operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Application-wide error type for player requests.
#[derive(Debug, Error, Serialize)]
#[serde(tag = "type", content = "details")]
pub enum RadioError {
    /// The requested address or index is not one of the configured stations.
    #[error("Unknown station: {0}")]
    UnknownStation(String),

    /// The requested volume is not a number.
    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    /// The requested sleep timer duration is non-positive or out of range.
    #[error("Invalid timer duration: {0}")]
    InvalidDuration(String),

    /// Player configuration is inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ErrorCode for RadioError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownStation(_) => "unknown_station",
            Self::InvalidVolume(_) => "invalid_volume",
            Self::InvalidDuration(_) => "invalid_duration",
            Self::Configuration(_) => "configuration_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

/// Convenient Result alias for player operations.
pub type RadioResult<T> = Result<T, RadioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_error_displays_user_notice_not_detail() {
        let err = StreamError::failed_to_start("connection refused");
        assert_eq!(err.to_string(), STREAM_FAILURE_NOTICE);
        assert_eq!(err.detail(), Some("connection refused"));
        assert_eq!(err.code(), "stream_start_failed");
    }

    #[test]
    fn radio_error_codes() {
        assert_eq!(
            RadioError::UnknownStation("u9".into()).code(),
            "unknown_station"
        );
        assert_eq!(
            RadioError::InvalidDuration("0".into()).code(),
            "invalid_duration"
        );
    }

    #[test]
    fn radio_error_serializes_tagged() {
        let json = serde_json::to_value(RadioError::InvalidVolume("NaN".into())).unwrap();
        assert_eq!(json["type"], "InvalidVolume");
        assert_eq!(json["details"], "NaN");
    }
}
