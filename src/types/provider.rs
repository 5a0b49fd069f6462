//! Speech backends.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the fixed set of speech backends.
///
/// Adding a backend means adding a variant here; every `match` on it (the
/// adapter registry in particular) then fails to compile until it is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// The host's built-in speech engine.
    Local,
    /// OpenAI `/v1/audio/speech`.
    #[serde(rename = "openai")]
    OpenAi,
    /// ElevenLabs `/v1/text-to-speech/{voice_id}`.
    ElevenLabs,
    /// Yandex SpeechKit `/speech/v1/tts:synthesize`.
    Yandex,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Local,
        Provider::OpenAi,
        Provider::ElevenLabs,
        Provider::Yandex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::OpenAi => "openai",
            Self::ElevenLabs => "elevenlabs",
            Self::Yandex => "yandex",
        }
    }

    /// Remote providers go over HTTP and need a credential.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Local)
    }

    /// Suggested voice for the provider. The same for every language.
    pub fn recommended_voice(&self) -> &'static str {
        match self {
            Self::OpenAi => "alloy",
            // Aria
            Self::ElevenLabs => "9BWtsMINqrJLrRacOk9x",
            Self::Yandex => "alena",
            Self::Local => "default",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "local-engine" | "web_speech" | "system" => Ok(Self::Local),
            "openai" | "provider-a" => Ok(Self::OpenAi),
            "elevenlabs" | "provider-b" => Ok(Self::ElevenLabs),
            "yandex" | "provider-c" => Ok(Self::Yandex),
            _ => Err(Error::unsupported(s, "not one of: local, openai, elevenlabs, yandex")),
        }
    }
}
