//! Yandex SpeechKit v1 endpoint.

use super::remote::{RemoteAdapter, WireFormat};
use crate::config::ProviderEndpoint;
use crate::types::{Provider, SpeechRequest};
use crate::Result;
use reqwest::header::AUTHORIZATION;

pub type YandexAdapter = RemoteAdapter<YandexWire>;

const DEFAULT_LANGUAGE: &str = "ru-RU";

/// IAM tokens carry this prefix; everything else is treated as an API key.
const IAM_TOKEN_PREFIX: &str = "t1.";

/// `POST /speech/v1/tts:synthesize` with a url-encoded form body.
#[derive(Debug, Clone)]
pub struct YandexWire {
    endpoint: ProviderEndpoint,
}

impl YandexWire {
    pub fn new(endpoint: ProviderEndpoint) -> Self {
        Self { endpoint }
    }

    pub(crate) fn form(&self, request: &SpeechRequest) -> Vec<(&'static str, String)> {
        vec![
            ("text", request.text().to_string()),
            ("voice", self.voice(request).to_string()),
            (
                "lang",
                self.endpoint
                    .language
                    .clone()
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            ),
            ("format", "mp3".to_string()),
            ("speed", request.rate().to_string()),
        ]
    }

    pub(crate) fn authorization(credential: &str) -> String {
        if credential.starts_with(IAM_TOKEN_PREFIX) {
            format!("Bearer {}", credential)
        } else {
            format!("Api-Key {}", credential)
        }
    }
}

impl WireFormat for YandexWire {
    const PROVIDER: Provider = Provider::Yandex;

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
            .post(self.endpoint.url("/speech/v1/tts:synthesize"))
            .header(AUTHORIZATION, Self::authorization(credential))
            .form(&self.form(request)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawSpeechRequest;
    use crate::validation::validate;

    #[test]
    fn test_form_fields() {
        let wire = YandexWire::new(ProviderEndpoint::yandex());
        let req = validate(RawSpeechRequest::new("Привет", "yandex").credential("k").rate(1.5)).unwrap();
        let form = wire.form(&req);
        let get = |k: &str| form.iter().find(|(key, _)| *key == k).map(|(_, v)| v.as_str());
        assert_eq!(get("text"), Some("Привет"));
        assert_eq!(get("voice"), Some("alena"));
        assert_eq!(get("lang"), Some("ru-RU"));
        assert_eq!(get("format"), Some("mp3"));
        assert_eq!(get("speed"), Some("1.5"));
    }

    #[test]
    fn test_authorization_scheme() {
        assert_eq!(YandexWire::authorization("AQVN123"), "Api-Key AQVN123");
        assert_eq!(YandexWire::authorization("t1.abc"), "Bearer t1.abc");
    }
}
