//! Trait abstraction for the host audio layer.
//!
//! The player never decodes audio itself. Everything it needs from the host
//! is expressed by [`AudioOutput`], so the playback controller can be driven
//! by a real player process or by a test double.

use async_trait::async_trait;

use crate::error::StreamResult;

/// A streaming audio output owned by exactly one playback controller.
///
/// Methods take `&mut self`: the controller serializes access, so an output
/// never sees overlapping calls.
#[async_trait]
pub trait AudioOutput: Send {
    /// Unloads whatever is currently loaded and loads `address`.
    ///
    /// Loading does not start playback. Any running stream is stopped first,
    /// so two streams are never audible at once.
    async fn load(&mut self, address: &str);

    /// Starts playing the loaded address.
    ///
    /// # Errors
    ///
    /// Returns a [`StreamError`](crate::error::StreamError) if the host
    /// rejects the stream (network failure, unsupported codec, nothing loaded).
    async fn play(&mut self) -> StreamResult<()>;

    /// Stops playback, keeping the loaded address for a later `play`.
    async fn pause(&mut self);

    /// Applies a volume in `[0, 1]` to the output, whether or not it is playing.
    async fn set_volume(&mut self, volume: f32);

    /// Releases every host resource held by the output.
    ///
    /// Called once on shutdown. The default implementation pauses.
    async fn release(&mut self) {
        self.pause().await;
    }
}
