//! HTTP preflight for stream addresses.
//!
//! Opens the stream with a plain GET, checks the status line and content type,
//! and reads the ICY (Shoutcast/Icecast) response headers that describe the
//! station. The body is never read; the connection is dropped as soon as the
//! headers arrive.

use std::time::Duration;

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;

use crate::constants::PREFLIGHT_TIMEOUT_SECS;
use crate::error::{StreamError, StreamResult};

/// ICY header carrying the station name.
const ICY_NAME: &str = "icy-name";
/// ICY header carrying the station genre.
const ICY_GENRE: &str = "icy-genre";
/// ICY header carrying the bitrate in kbit/s.
const ICY_BITRATE: &str = "icy-br";

/// What the stream server says about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamInfo {
    /// `Content-Type` of the stream, if sent.
    pub content_type: Option<String>,
    /// Station name from `icy-name`.
    pub name: Option<String>,
    /// Genre from `icy-genre`.
    pub genre: Option<String>,
    /// Bitrate from `icy-br`.
    pub bitrate_kbps: Option<u32>,
}

/// Extracts [`StreamInfo`] from response headers.
///
/// Empty header values are treated as absent. Some servers send
/// `icy-br: 128,128`; only the first number is used.
#[must_use]
pub fn stream_info_from_headers(headers: &HeaderMap) -> StreamInfo {
    let text = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let bitrate_kbps = text(ICY_BITRATE).and_then(|v| {
        v.split(',')
            .next()
            .and_then(|first| first.trim().parse().ok())
    });

    StreamInfo {
        content_type: headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        name: text(ICY_NAME),
        genre: text(ICY_GENRE),
        bitrate_kbps,
    }
}

/// Whether a content type can plausibly be an audio stream.
///
/// `application/octet-stream` is accepted because misconfigured Icecast
/// mounts commonly send it.
#[must_use]
pub fn is_audio_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("audio/")
        || essence == "application/ogg"
        || essence == "application/octet-stream"
}

/// Issues preflight requests against stream addresses.
#[derive(Clone)]
pub struct StreamProbe {
    client: Client,
}

impl StreamProbe {
    /// Creates a probe with the default request timeout.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if the HTTP client cannot be built
    /// (for example, when no TLS backend is available).
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(PREFLIGHT_TIMEOUT_SECS))
            .user_agent(concat!("nightcap/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Checks that `address` answers like an audio stream.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`] for connection failures, non-success status
    /// codes, and non-audio content types.
    pub async fn probe(&self, address: &str) -> StreamResult<StreamInfo> {
        let response = self
            .client
            .get(address)
            .send()
            .await
            .map_err(|e| StreamError::failed_to_start(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::failed_to_start(format!("HTTP {}", status)));
        }

        let info = stream_info_from_headers(response.headers());
        if let Some(content_type) = info.content_type.as_deref() {
            if !is_audio_content_type(content_type) {
                return Err(StreamError::failed_to_start(format!(
                    "unexpected content type: {}",
                    content_type
                )));
            }
        }

        log::debug!(
            "[Probe] {} -> name={:?} type={:?} bitrate={:?}",
            address,
            info.name,
            info.content_type,
            info.bitrate_kbps
        );
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn reads_icy_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
        headers.insert(ICY_NAME, HeaderValue::from_static("RMF FM"));
        headers.insert(ICY_GENRE, HeaderValue::from_static("  "));
        headers.insert(ICY_BITRATE, HeaderValue::from_static("128,128"));

        let info = stream_info_from_headers(&headers);
        assert_eq!(info.content_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(info.name.as_deref(), Some("RMF FM"));
        assert_eq!(info.genre, None);
        assert_eq!(info.bitrate_kbps, Some(128));
    }

    #[test]
    fn missing_headers_yield_empty_info() {
        assert_eq!(
            stream_info_from_headers(&HeaderMap::new()),
            StreamInfo::default()
        );
    }

    #[test]
    fn audio_content_types() {
        assert!(is_audio_content_type("audio/aac"));
        assert!(is_audio_content_type("Audio/MPEG; charset=binary"));
        assert!(is_audio_content_type("application/ogg"));
        assert!(!is_audio_content_type("text/html; charset=utf-8"));
        assert!(!is_audio_content_type("application/json"));
    }
}
