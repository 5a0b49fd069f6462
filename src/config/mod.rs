//! 服务配置：各提供商端点、HTTP 参数、本地引擎与播放器偏好。
//!
//! Service configuration.
//!
//! Built in code, loaded from YAML, or both; environment variables are applied
//! last via [`TtsConfig::with_env_overrides`]:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `TTS_OPENAI_BASE_URL` | `openai.base_url` |
//! | `TTS_ELEVENLABS_BASE_URL` | `elevenlabs.base_url` |
//! | `TTS_YANDEX_BASE_URL` | `yandex.base_url` |
//! | `TTS_PROXY_URL` | `proxy_url` |
//! | `TTS_HTTP_TIMEOUT_SECS` | `request_timeout_secs` |
//! | `TTS_PLAYER` | `player` |
//! | `TTS_ENGINE` | `engine` |
//! | `TTS_LOCAL_FALLBACK` | `local_fallback` |

use crate::types::Provider;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Where and how to reach one remote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub default_voice: String,
    /// Language tag sent to providers that need one (Yandex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ProviderEndpoint {
    pub fn openai() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: Some("tts-1-hd".to_string()),
            default_voice: Provider::OpenAi.recommended_voice().to_string(),
            language: None,
        }
    }

    pub fn elevenlabs() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            model: Some("eleven_multilingual_v2".to_string()),
            default_voice: Provider::ElevenLabs.recommended_voice().to_string(),
            language: None,
        }
    }

    pub fn yandex() -> Self {
        Self {
            base_url: "https://tts.api.cloud.yandex.net".to_string(),
            model: None,
            default_voice: Provider::Yandex.recommended_voice().to_string(),
            language: Some("ru-RU".to_string()),
        }
    }

    /// `base_url` joined with `path`, without doubled slashes.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub openai: ProviderEndpoint,
    pub elevenlabs: ProviderEndpoint,
    pub yandex: ProviderEndpoint,
    /// Whole-request HTTP timeout. `None` (the default) means the service
    /// never times a request out; `stop()` is the way to abandon one.
    pub request_timeout_secs: Option<u64>,
    pub proxy_url: Option<String>,
    /// Audio player program (name on `PATH` or absolute path).
    pub player: Option<String>,
    /// Local engine program (name on `PATH` or absolute path).
    pub engine: Option<String>,
    /// Speak with the local engine when a remote provider fails.
    pub local_fallback: bool,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            openai: ProviderEndpoint::openai(),
            elevenlabs: ProviderEndpoint::elevenlabs(),
            yandex: ProviderEndpoint::yandex(),
            request_timeout_secs: None,
            proxy_url: None,
            player: None,
            engine: None,
            local_fallback: false,
        }
    }
}

impl TtsConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid YAML: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read config: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config"),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup, e.g. a map in tests.
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("TTS_OPENAI_BASE_URL") {
            self.openai.base_url = v;
        }
        if let Some(v) = lookup("TTS_ELEVENLABS_BASE_URL") {
            self.elevenlabs.base_url = v;
        }
        if let Some(v) = lookup("TTS_YANDEX_BASE_URL") {
            self.yandex.base_url = v;
        }
        if let Some(v) = lookup("TTS_PROXY_URL") {
            self.proxy_url = Some(v);
        }
        if let Some(v) = lookup("TTS_HTTP_TIMEOUT_SECS") {
            match v.trim().parse::<u64>() {
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(e) => warn!(value = %v, error = %e, "ignoring TTS_HTTP_TIMEOUT_SECS"),
            }
        }
        if let Some(v) = lookup("TTS_PLAYER") {
            self.player = Some(v);
        }
        if let Some(v) = lookup("TTS_ENGINE") {
            self.engine = Some(v);
        }
        if let Some(v) = lookup("TTS_LOCAL_FALLBACK") {
            self.local_fallback = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        self
    }

    pub fn endpoint(&self, provider: Provider) -> Option<&ProviderEndpoint> {
        match provider {
            Provider::Local => None,
            Provider::OpenAi => Some(&self.openai),
            Provider::ElevenLabs => Some(&self.elevenlabs),
            Provider::Yandex => Some(&self.yandex),
        }
    }

    /// Fail fast on unusable URLs or timeouts.
    pub fn validate(&self) -> Result<()> {
        for provider in Provider::ALL {
            let Some(endpoint) = self.endpoint(provider) else {
                continue;
            };
            let field = format!("{}.base_url", provider);
            let url = url::Url::parse(&endpoint.base_url).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid base URL: {}", e),
                    ErrorContext::new()
                        .with_field_path(field.clone())
                        .with_details(endpoint.base_url.clone())
                        .with_source("config"),
                )
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::configuration_with_context(
                    "base URL must use http or https",
                    ErrorContext::new()
                        .with_field_path(field)
                        .with_details(endpoint.base_url.clone())
                        .with_source("config"),
                ));
            }
            if endpoint.default_voice.trim().is_empty() {
                return Err(Error::configuration_with_context(
                    "default voice must not be empty",
                    ErrorContext::new()
                        .with_field_path(format!("{}.default_voice", provider))
                        .with_source("config"),
                ));
            }
        }
        if let Some(proxy) = &self.proxy_url {
            url::Url::parse(proxy).map_err(|e| {
                Error::configuration_with_context(
                    format!("invalid proxy URL: {}", e),
                    ErrorContext::new()
                        .with_field_path("proxy_url")
                        .with_source("config"),
                )
            })?;
        }
        if self.request_timeout_secs == Some(0) {
            return Err(Error::configuration_with_context(
                "timeout must be positive",
                ErrorContext::new()
                    .with_field_path("request_timeout_secs")
                    .with_source("config"),
            ));
        }
        Ok(())
    }
}
