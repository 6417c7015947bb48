//! Host audio layer backed by an external player process.
//!
//! Decoding and output are delegated to a command-line player (mpv by
//! default). One process runs per playing stream: `play` spawns it, `pause`
//! kills it. A process that exits inside the start-up grace period is reported
//! as a failed stream start.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::{Child, Command};

use super::probe::StreamProbe;
use super::traits::AudioOutput;
use crate::constants::DEFAULT_STARTUP_GRACE_MS;
use crate::error::{StreamError, StreamResult};

/// Placeholder replaced by the stream address.
const URL_PLACEHOLDER: &str = "{url}";
/// Placeholder replaced by the volume as a percentage (0-100).
const VOLUME_PLACEHOLDER: &str = "{volume}";
/// Placeholder replaced by the IPC socket path.
const IPC_PLACEHOLDER: &str = "{ipc}";

/// Distinguishes IPC sockets of several outputs in one process.
static NEXT_OUTPUT_ID: AtomicU64 = AtomicU64::new(0);

/// Command line used to launch the external player.
///
/// Arguments may contain `{url}`, `{volume}` and `{ipc}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCommand {
    /// Executable name or path.
    pub program: String,
    /// Argument template.
    pub args: Vec<String>,
}

impl Default for PlayerCommand {
    fn default() -> Self {
        Self::mpv()
    }
}

impl PlayerCommand {
    /// mpv with video disabled and JSON IPC enabled for live volume changes.
    #[must_use]
    pub fn mpv() -> Self {
        Self {
            program: "mpv".to_string(),
            args: vec![
                "--no-video".to_string(),
                "--really-quiet".to_string(),
                format!("--volume={}", VOLUME_PLACEHOLDER),
                format!("--input-ipc-server={}", IPC_PLACEHOLDER),
                URL_PLACEHOLDER.to_string(),
            ],
        }
    }

    /// Command line for `program`.
    ///
    /// An mpv binary gets the full mpv template; any other player is passed
    /// the stream address as its only argument.
    #[must_use]
    pub fn for_program(program: impl Into<String>) -> Self {
        let program = program.into();
        let is_mpv = Path::new(&program)
            .file_stem()
            .is_some_and(|stem| stem.eq_ignore_ascii_case("mpv"));
        if is_mpv {
            Self {
                program,
                ..Self::mpv()
            }
        } else {
            Self {
                program,
                args: vec![URL_PLACEHOLDER.to_string()],
            }
        }
    }

    /// Whether the template enables the IPC socket.
    #[must_use]
    pub fn uses_ipc(&self) -> bool {
        self.args.iter().any(|a| a.contains(IPC_PLACEHOLDER))
    }

    /// Expands the argument template.
    #[must_use]
    pub fn render_args(&self, url: &str, volume: f32, ipc_path: &Path) -> Vec<String> {
        let volume = volume_percent(volume).to_string();
        let ipc = ipc_path.to_string_lossy();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(URL_PLACEHOLDER, url)
                    .replace(VOLUME_PLACEHOLDER, &volume)
                    .replace(IPC_PLACEHOLDER, &ipc)
            })
            .collect()
    }
}

/// Converts a `[0, 1]` volume into the 0-100 scale players use.
#[must_use]
pub fn volume_percent(volume: f32) -> u8 {
    (volume.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Builds the mpv JSON IPC command that sets the volume.
#[must_use]
pub fn volume_ipc_command(volume: f32) -> String {
    let command = serde_json::json!({
        "command": ["set_property", "volume", volume_percent(volume)]
    });
    format!("{}\n", command)
}

/// [`AudioOutput`] that runs one external player process per stream.
pub struct ProcessOutput {
    command: PlayerCommand,
    startup_grace: Duration,
    preflight: Option<StreamProbe>,
    ipc_path: PathBuf,
    address: Option<String>,
    volume: f32,
    child: Option<Child>,
}

impl ProcessOutput {
    /// Creates an output that launches `command`.
    pub fn new(command: PlayerCommand) -> Self {
        let id = NEXT_OUTPUT_ID.fetch_add(1, Ordering::Relaxed);
        let ipc_path =
            std::env::temp_dir().join(format!("nightcap-{}-{}.sock", std::process::id(), id));
        Self {
            command,
            startup_grace: Duration::from_millis(DEFAULT_STARTUP_GRACE_MS),
            preflight: None,
            ipc_path,
            address: None,
            volume: crate::constants::DEFAULT_VOLUME,
            child: None,
        }
    }

    /// Sets how long a freshly spawned player must survive to count as started.
    #[must_use]
    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }

    /// Enables the HTTP preflight before each spawn.
    #[must_use]
    pub fn with_preflight(mut self, probe: StreamProbe) -> Self {
        self.preflight = Some(probe);
        self
    }

    /// The currently loaded address.
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    /// The last volume applied.
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Whether a player process is running.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    async fn kill_child(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                log::debug!("[ProcessOutput] Player already gone: {}", e);
            }
        }
    }

    #[cfg(unix)]
    async fn push_volume(&self) {
        use tokio::io::AsyncWriteExt;
        use tokio::net::UnixStream;

        let payload = volume_ipc_command(self.volume);
        match UnixStream::connect(&self.ipc_path).await {
            Ok(mut stream) => {
                if let Err(e) = stream.write_all(payload.as_bytes()).await {
                    log::warn!("[ProcessOutput] Failed to send volume over IPC: {}", e);
                }
            }
            Err(e) => {
                log::debug!(
                    "[ProcessOutput] IPC socket {} unavailable: {}",
                    self.ipc_path.display(),
                    e
                );
            }
        }
    }

    #[cfg(not(unix))]
    async fn push_volume(&self) {
        log::debug!("[ProcessOutput] Live volume changes apply on next start on this platform");
    }
}

#[async_trait]
impl AudioOutput for ProcessOutput {
    async fn load(&mut self, address: &str) {
        self.kill_child().await;
        self.address = Some(address.to_string());
    }

    async fn play(&mut self) -> StreamResult<()> {
        if self.is_running() {
            return Ok(());
        }

        let address = self
            .address
            .clone()
            .ok_or_else(|| StreamError::failed_to_start("no stream address loaded"))?;

        if let Some(probe) = &self.preflight {
            probe.probe(&address).await?;
        }

        let args = self
            .command
            .render_args(&address, self.volume, &self.ipc_path);
        log::debug!(
            "[ProcessOutput] Spawning {} {:?}",
            self.command.program,
            args
        );

        let mut child = Command::new(&self.command.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                StreamError::failed_to_start(format!(
                    "failed to launch {}: {}",
                    self.command.program, e
                ))
            })?;

        match tokio::time::timeout(self.startup_grace, child.wait()).await {
            Ok(Ok(status)) => Err(StreamError::failed_to_start(format!(
                "player exited during start-up ({})",
                status
            ))),
            Ok(Err(e)) => Err(StreamError::failed_to_start(format!(
                "failed to wait for player: {}",
                e
            ))),
            Err(_) => {
                self.child = Some(child);
                Ok(())
            }
        }
    }

    async fn pause(&mut self) {
        self.kill_child().await;
    }

    async fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if self.command.uses_ipc() && self.is_running() {
            self.push_volume().await;
        }
    }

    async fn release(&mut self) {
        self.kill_child().await;
        if self.command.uses_ipc() {
            let _ = std::fs::remove_file(&self.ipc_path);
        }
    }
}
