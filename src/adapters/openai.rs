//! OpenAI speech endpoint.

use super::remote::{RemoteAdapter, WireFormat};
use crate::config::ProviderEndpoint;
use crate::types::{Provider, SpeechRequest};
use crate::Result;

pub type OpenAiAdapter = RemoteAdapter<OpenAiWire>;

const DEFAULT_MODEL: &str = "tts-1-hd";

/// `POST /v1/audio/speech` with a bearer token and a JSON body.
#[derive(Debug, Clone)]
pub struct OpenAiWire {
    endpoint: ProviderEndpoint,
}

impl OpenAiWire {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    pub(crate) fn body(&self, request: &SpeechRequest) -> serde_json::Value {
        serde_json::json!({
            "model": self.endpoint.model.as_deref().unwrap_or(DEFAULT_MODEL),
            "input": request.text(),
            "voice": self.voice(request),
            "response_format": "mp3",
            "speed": request.rate(),
        })
    }
}

impl WireFormat for OpenAiWire {
    const PROVIDER: Provider = Provider::OpenAi;

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
            .post(self.endpoint.url("/v1/audio/speech"))
            .bearer_auth(credential)
            .json(&self.body(request)))
    }
}
