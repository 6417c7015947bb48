//! Host audio layer.
//!
//! - [`AudioOutput`]: the contract the playback controller drives
//! - [`ProcessOutput`]: implementation delegating to an external player
//! - [`StreamProbe`]: optional HTTP preflight and ICY header parsing

pub mod probe;
pub mod process;
pub mod traits;

pub use probe::{is_audio_content_type, stream_info_from_headers, StreamInfo, StreamProbe};
pub use process::{PlayerCommand, ProcessOutput};
pub use traits::AudioOutput;
