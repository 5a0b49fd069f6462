//! ElevenLabs text-to-speech endpoint.

use super::remote::{RemoteAdapter, WireFormat};
use crate::config::ProviderEndpoint;
use crate::types::{Provider, SpeechRequest};
use crate::{Error, ErrorContext, Result};
use reqwest::header::ACCEPT;

pub type ElevenLabsAdapter = RemoteAdapter<ElevenLabsWire>;

const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

/// `POST /v1/text-to-speech/{voice_id}` with an `xi-api-key` header.
#[derive(Debug, Clone)]
pub struct ElevenLabsWire {
    endpoint: ProviderEndpoint,
}

impl ElevenLabsWire {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    pub(crate) fn url(&self, voice: &str) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.endpoint.url("/v1/text-to-speech")).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid base URL: {}", e),
                ErrorContext::new().with_field_path("elevenlabs.base_url"),
            )
        })?;
        url.path_segments_mut()
            .map_err(|_| Error::configuration("elevenlabs base URL cannot carry a path"))?
            .push(voice);
        Ok(url)
    }

    pub(crate) fn body(&self, request: &SpeechRequest) -> serde_json::Value {
        serde_json::json!({
            "text": request.text(),
            "model_id": self.endpoint.model.as_deref().unwrap_or(DEFAULT_MODEL),
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.5,
                "speed": request.rate(),
            },
        })
    }
}

impl WireFormat for ElevenLabsWire {
    const PROVIDER: Provider = Provider::ElevenLabs;

    fn endpoint(&self) -> &ProviderEndpoint {
        &self.endpoint
    }

    fn request(
        &self,
        client: &reqwest::Client,
        request: &SpeechRequest,
        credential: &str,
    ) -> Result<reqwest::RequestBuilder> {
        Ok(client
            .post(self.url(self.voice(request))?)
            .header("xi-api-key", credential)
            .header(ACCEPT, "audio/mpeg")
            .json(&self.body(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawSpeechRequest;
    use crate::validation::validate;

    #[test]
    fn test_voice_is_a_path_segment() {
        let wire = ElevenLabsWire::new(ProviderEndpoint::elevenlabs());
        let url = wire.url("9BWtsMINqrJLrRacOk9x").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.elevenlabs.io/v1/text-to-speech/9BWtsMINqrJLrRacOk9x"
        );
        let url = wire.url("a/b").unwrap();
        assert!(url.as_str().ends_with("/v1/text-to-speech/a%2Fb"));
    }

    #[test]
    fn test_body() {
        let wire = ElevenLabsWire::new(ProviderEndpoint::elevenlabs());
        let req = validate(RawSpeechRequest::new("Привет", "elevenlabs").credential("k")).unwrap();
        let body = wire.body(&req);
        assert_eq!(body["text"], "Привет");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert_eq!(body["voice_settings"]["stability"], 0.5);
        assert_eq!(body["voice_settings"]["speed"], 1.0);
    }
}
