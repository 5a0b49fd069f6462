//! 音频模块：音频解码、播放句柄与音频输出。
//!
//! Audio handling shared by every adapter.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`Playback`] | Exclusively-owned, cancellable handle for one utterance |
//! | [`AudioSink`] | Output primitive that turns a decoded buffer into a [`Playback`] |
//! | [`decode`] | Turns a provider response body into an [`AudioBuffer`] |
//! | [`CommandSink`] | Default sink piping audio into a host player program |

pub mod decode;
pub mod process;
pub mod sink;

pub use decode::{decode, AudioBuffer, AudioFormat};
pub use process::ProcessPlayback;
pub use sink::CommandSink;

use crate::types::Provider;
use crate::Result;
use async_trait::async_trait;

/// Handle to one utterance's audible output.
///
/// The session owns its handle exclusively; the service calls `start` once,
/// then awaits `finished` unless the session is stopped, in which case it
/// calls `cancel` instead. `cancel` must be safe to call before `start`.
#[async_trait]
pub trait Playback: Send {
    /// Begin producing audible output.
    async fn start(&mut self) -> Result<()>;

    /// Resolve once output has run to its end.
    async fn finished(&mut self) -> Result<()>;

    /// Halt output and release the output channel.
    async fn cancel(&mut self);
}

/// Audio output primitive used by the remote adapters.
pub trait AudioSink: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Prepare `buffer` for playback. Nothing is audible until
    /// [`Playback::start`] is called on the returned handle.
    fn open(&self, provider: Provider, buffer: AudioBuffer) -> Result<Box<dyn Playback>>;
}
