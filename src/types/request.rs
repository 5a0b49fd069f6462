//! Speech requests: the caller-facing raw form and the validated form.

use super::Provider;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_RATE: f32 = 1.0;
pub const DEFAULT_PITCH: f32 = 1.0;

/// Unvalidated speech request as a caller builds it.
///
/// `provider` stays a string here so that an unknown provider name surfaces as
/// an `UnsupportedProvider` error from `speak()` rather than a parse failure at
/// the call site.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RawSpeechRequest {
    pub text: String,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(default, skip_serializing, alias = "apiKey")]
    pub credential: Option<String>,
}

impl RawSpeechRequest {
    pub fn new(text: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider: provider.into(),
            ..Default::default()
        }
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

impl fmt::Debug for RawSpeechRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSpeechRequest")
            .field("text", &self.text)
            .field("provider", &self.provider)
            .field("voice", &self.voice)
            .field("rate", &self.rate)
            .field("pitch", &self.pitch)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Validated, immutable speech request.
///
/// Only [`crate::validation::validate`] constructs one, so holders can rely on:
/// non-blank text, finite rate and pitch, and a non-empty credential whenever
/// the provider is remote.
#[derive(Clone, PartialEq)]
pub struct SpeechRequest {
    text: String,
    provider: Provider,
    voice: Option<String>,
    rate: f32,
    pitch: f32,
    credential: Option<String>,
}

impl SpeechRequest {
    pub(crate) fn new(
        text: String,
        provider: Provider,
        voice: Option<String>,
        rate: f32,
        pitch: f32,
        credential: Option<String>,
    ) -> Self {
        Self {
            text,
            provider,
            voice,
            rate,
            pitch,
            credential,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn voice(&self) -> Option<&str> {
        self.voice.as_deref()
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Same utterance routed to the local engine. Remote voice identifiers
    /// mean nothing to the host engine, so the voice is dropped.
    pub(crate) fn for_local_engine(&self) -> Self {
        Self {
            text: self.text.clone(),
            provider: Provider::Local,
            voice: None,
            rate: self.rate,
            pitch: self.pitch,
            credential: None,
        }
    }
}

impl fmt::Debug for SpeechRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechRequest")
            .field("text", &self.text)
            .field("provider", &self.provider)
            .field("voice", &self.voice)
            .field("rate", &self.rate)
            .field("pitch", &self.pitch)
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_credential() {
        let raw = RawSpeechRequest::new("hi", "openai").credential("sk-secret");
        let dbg = format!("{:?}", raw);
        assert!(!dbg.contains("sk-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn test_deserialize_accepts_api_key_alias() {
        let raw: RawSpeechRequest = serde_json::from_str(
            r#"{"text":"hi","provider":"yandex","apiKey":"k","rate":1.5}"#,
        )
        .unwrap();
        assert_eq!(raw.credential.as_deref(), Some("k"));
        assert_eq!(raw.rate, Some(1.5));
        assert_eq!(raw.pitch, None);
    }

    #[test]
    fn test_serialize_never_writes_credential() {
        let raw = RawSpeechRequest::new("hi", "openai").credential("sk-secret");
        let json = serde_json::to_string(&raw).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
