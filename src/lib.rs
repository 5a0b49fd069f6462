//! # tts-lib-rust
//!
//! 单会话文本转语音编排库，统一本地语音引擎与多家远程 TTS 服务的调用接口。
//!
//! Single-session text-to-speech orchestration for Rust. One service speaks
//! through a host speech engine or one of several remote HTTP providers behind
//! a single `speak()`/`stop()` contract.
//!
//! ## Overview
//!
//! - **One session at a time**: a new `speak()` stops and clears the previous
//!   session before the new one starts loading
//! - **Prompt cancellation**: `stop()` abandons in-flight network requests and
//!   silences playback; the pending `speak()` resolves with
//!   [`SpeakOutcome::Stopped`]
//! - **Normalized errors**: every failure is one [`ErrorKind`], tagged with the
//!   provider that produced it
//! - **Observable**: every session transition is broadcast as a [`SessionEvent`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tts_lib_rust::{RawSpeechRequest, SpeakOutcome, TtsService};
//!
//! #[tokio::main]
//! async fn main() -> tts_lib_rust::Result<()> {
//!     let tts = TtsService::builder().build()?;
//!
//!     let request = RawSpeechRequest::new("Hello there", "openai")
//!         .voice("nova")
//!         .credential(std::env::var("TTS_API_KEY").unwrap_or_default());
//!
//!     match tts.speak(request).await? {
//!         SpeakOutcome::Completed => println!("done"),
//!         SpeakOutcome::Stopped => println!("interrupted"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`service`] | The orchestrator: session lifecycle, preemption, stop |
//! | [`adapters`] | Local engine and remote provider adapters |
//! | [`audio`] | Response decoding, playback handles, audio output |
//! | [`engine`] | Host speech engines |
//! | [`registry`] | Provider capabilities and adapter dispatch |
//! | [`config`] | Endpoints, player and engine selection, env overrides |
//! | [`types`] | Requests, providers, session states and events |
//! | [`error_code`] | Normalized error kinds and codes |

pub mod adapters;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error_code;
pub mod registry;
pub mod service;
pub mod types;
pub mod utils;
pub mod validation;

// Re-export main types for convenience
pub use config::{ProviderEndpoint, TtsConfig};
pub use error_code::ErrorKind;
pub use registry::{is_provider_supported, CapabilityRegistry, CapabilityStatus};
pub use service::{TtsService, TtsServiceBuilder};
pub use types::{
    PlaybackSession, Provider, RawSpeechRequest, SessionEvent, SessionId, SessionState,
    SpeakOutcome, SpeechRequest,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
