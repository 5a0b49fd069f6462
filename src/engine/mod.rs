//! 本地语音引擎：宿主环境内置语音合成能力的抽象。
//!
//! Host speech engine.
//!
//! [`SpeechEngine`] is the seam between the local adapter and whatever speech
//! facility the host offers. [`CommandEngine`] drives the common command-line
//! engines; tests and embedders can supply their own.

pub mod command;

pub use command::{CommandEngine, EngineKind};

use crate::audio::Playback;
use crate::Result;
use async_trait::async_trait;

/// One utterance for the host engine; parameters map one-to-one onto the
/// engine's own voice, rate and pitch controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub voice: Option<String>,
    pub rate: f32,
    pub pitch: f32,
}

#[async_trait]
pub trait SpeechEngine: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Whether the host actually exposes this facility. Must be stable for
    /// the lifetime of the engine.
    fn is_available(&self) -> bool;

    /// Voices the engine can speak with.
    async fn voices(&self) -> Result<Vec<String>>;

    /// Prepare an utterance. Speech begins on [`Playback::start`] and
    /// [`Playback::cancel`] invokes the engine's own stop primitive.
    fn utter(&self, utterance: Utterance) -> Result<Box<dyn Playback>>;
}
