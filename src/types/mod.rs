//! 类型系统模块：定义语音请求、提供商与播放会话的核心数据类型。
//!
//! # Types Module
//!
//! Core data types shared by the validator, adapters, and the service.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Provider`] | The four speech backends |
//! | [`RawSpeechRequest`] | Caller-built, unvalidated request |
//! | [`SpeechRequest`] | Normalized, immutable request produced by validation |
//! | [`SessionState`] | Session state machine |
//! | [`SessionEvent`] | One observed state transition |
//! | [`PlaybackSession`] | Snapshot of the active session |
//!
//! ## Example
//!
//! ```rust
//! use tts_lib_rust::types::{Provider, RawSpeechRequest};
//!
//! let raw = RawSpeechRequest::new("Hello", "openai")
//!     .voice("nova")
//!     .credential("sk-test");
//! assert_eq!(raw.provider, "openai");
//! assert_eq!("elevenlabs".parse::<Provider>().unwrap(), Provider::ElevenLabs);
//! ```

pub mod provider;
pub mod request;
pub mod session;

pub use provider::Provider;
pub use request::{RawSpeechRequest, SpeechRequest, DEFAULT_PITCH, DEFAULT_RATE};
pub use session::{PlaybackSession, SessionEvent, SessionId, SessionState, SpeakOutcome};
