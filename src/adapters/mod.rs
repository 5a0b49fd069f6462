//! 提供商适配层：通过统一 trait 屏蔽本地引擎与三家远程 TTS 服务的差异
//!
//! Provider adapters.
//!
//! Every backend implements [`SpeechAdapter`]: given a validated request and
//! the session's cancellation token, produce an exclusively-owned
//! [`Playback`] handle. Adapters classify their own failures into the
//! normalized kinds and never retry.
//!
//! The three remote providers share one flow ([`RemoteAdapter`]) and differ
//! only in their [`WireFormat`]: endpoint, authentication header and payload.

pub mod elevenlabs;
pub mod local;
pub mod openai;
pub mod remote;
pub mod yandex;

pub use elevenlabs::{ElevenLabsAdapter, ElevenLabsWire};
pub use local::LocalAdapter;
pub use openai::{OpenAiAdapter, OpenAiWire};
pub use remote::{http_client, RemoteAdapter, WireFormat};
pub use yandex::{YandexAdapter, YandexWire};

use crate::audio::Playback;
use crate::types::{Provider, SpeechRequest};
use crate::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Uniform synthesis capability.
#[async_trait]
pub trait SpeechAdapter: Send + Sync + std::fmt::Debug {
    /// Backend this adapter serves.
    fn provider(&self) -> Provider;

    /// Synthesize `request` and return a handle ready to start.
    ///
    /// Implementations must watch `cancel` across every suspension point and
    /// return [`crate::Error::Cancelled`] promptly once it fires, abandoning
    /// in-flight network or decode work.
    async fn synthesize(
        &self,
        request: &SpeechRequest,
        cancel: &CancellationToken,
    ) -> Result<Box<dyn Playback>>;
}
