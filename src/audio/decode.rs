//! Decoding provider responses into playable audio buffers.

use crate::types::Provider;
use crate::{Error, Result};
use base64::Engine as _;
use bytes::Bytes;

/// Encoded audio ready for an output primitive.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub data: Bytes,
    pub format: AudioFormat,
}

/// Supported audio formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
}

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Mp3 => "audio/mpeg",
            Self::Opus => "audio/ogg",
            Self::Aac => "audio/aac",
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
        }
    }

    /// Identify the container from its leading bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data {
            [b'I', b'D', b'3', ..] => Some(Self::Mp3),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => Some(Self::Wav),
            [b'O', b'g', b'g', b'S', ..] => Some(Self::Opus),
            [b'f', b'L', b'a', b'C', ..] => Some(Self::Flac),
            // ADTS: 12-bit sync, layer bits always 00
            [0xFF, b, ..] if b & 0xF6 == 0xF0 => Some(Self::Aac),
            // MPEG audio frame sync with a non-reserved layer
            [0xFF, b, ..] if b & 0xE0 == 0xE0 && b & 0x06 != 0 => Some(Self::Mp3),
            _ => None,
        }
    }
}

#[derive(serde::Deserialize)]
struct Envelope {
    #[serde(alias = "audioContent", alias = "audio_base64")]
    audio_content: Option<String>,
}

/// Decode a response body into an [`AudioBuffer`].
///
/// Accepts raw encoded audio or a JSON envelope carrying base64 audio under
/// `audioContent` (relay functions) or `audio_base64`. Empty or unrecognised
/// payloads are playback failures.
pub fn decode(provider: Provider, body: Bytes, content_type: Option<&str>) -> Result<AudioBuffer> {
    let is_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("json"))
        .unwrap_or(false)
        || body.first() == Some(&b'{');

    let data = if is_json {
        let envelope: Envelope = serde_json::from_slice(&body)
            .map_err(|e| Error::playback(provider, format!("malformed audio envelope: {}", e)))?;
        let encoded = envelope
            .audio_content
            .ok_or_else(|| Error::playback(provider, "no audio content received"))?;
        let raw = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::playback(provider, format!("invalid base64 audio: {}", e)))?;
        Bytes::from(raw)
    } else {
        body
    };

    if data.is_empty() {
        return Err(Error::playback(provider, "no audio content received"));
    }

    let format = AudioFormat::sniff(&data).ok_or_else(|| {
        Error::playback(
            provider,
            format!(
                "unrecognised audio payload ({} bytes, content-type {})",
                data.len(),
                content_type.unwrap_or("unknown")
            ),
        )
    })?;

    Ok(AudioBuffer { data, format })
}
