//! 能力注册表：判断提供商在当前环境中是否可用，并按枚举分派适配器
//!
//! Capability registry and adapter registry.
//!
//! [`CapabilityRegistry`] answers "can this provider run here?" as a pure
//! function of the provider for a fixed host: the local engine is supported
//! only when the host exposes a speech facility, remote providers always are
//! (their real availability only shows at call time).
//!
//! [`AdapterRegistry`] maps each [`Provider`] to exactly one adapter. It is a
//! struct with one field per provider rather than a map, so a new provider
//! cannot be added without wiring its adapter.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::adapters::SpeechAdapter;
use crate::engine::{CommandEngine, SpeechEngine};
use crate::types::Provider;
use crate::{Error, Result};

/// Which providers the host environment can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityRegistry {
    local_engine: bool,
}

/// Host detection runs once per process; the answer never changes afterwards.
static HOST: Lazy<CapabilityRegistry> = Lazy::new(CapabilityRegistry::detect);

impl CapabilityRegistry {
    pub fn new(local_engine_available: bool) -> Self {
        Self {
            local_engine: local_engine_available,
        }
    }

    /// Probe the host for a speech engine (honouring `TTS_ENGINE`).
    pub fn detect() -> Self {
        let preferred = std::env::var("TTS_ENGINE").ok();
        Self::for_engine(&CommandEngine::detect(preferred.as_deref()))
    }

    pub fn for_engine(engine: &dyn SpeechEngine) -> Self {
        Self::new(engine.is_available())
    }

    /// Registry for this process's host environment.
    pub fn host() -> &'static CapabilityRegistry {
        &HOST
    }

    pub fn supports(&self, provider: Provider) -> bool {
        match provider {
            Provider::Local => self.local_engine,
            Provider::OpenAi | Provider::ElevenLabs | Provider::Yandex => true,
        }
    }

    pub fn supported_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.supports(*p))
            .collect()
    }

    /// Human-readable status of every provider.
    pub fn status_report(&self) -> HashMap<Provider, CapabilityStatus> {
        Provider::ALL
            .into_iter()
            .map(|p| {
                let status = match (p.is_remote(), self.supports(p)) {
                    (true, _) => CapabilityStatus::Remote,
                    (false, true) => CapabilityStatus::Available,
                    (false, false) => CapabilityStatus::Unavailable {
                        reason: "no host speech engine".to_string(),
                    },
                };
                (p, status)
            })
            .collect()
    }
}

/// Whether `provider` can run in this process's host environment.
pub fn is_provider_supported(provider: Provider) -> bool {
    CapabilityRegistry::host().supports(provider)
}

/// String form of [`is_provider_supported`]; unknown names are unsupported.
pub fn is_provider_name_supported(name: &str) -> bool {
    name.parse::<Provider>()
        .map(is_provider_supported)
        .unwrap_or(false)
}

/// Status of a provider in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Host facility present.
    Available,
    /// Reachable over HTTP; availability decided per call.
    Remote,
    Unavailable { reason: String },
}

impl std::fmt::Display for CapabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Remote => write!(f, "remote (checked per call)"),
            Self::Unavailable { reason } => write!(f, "unavailable: {}", reason),
        }
    }
}

/// One adapter per provider.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    local: Arc<dyn SpeechAdapter>,
    openai: Arc<dyn SpeechAdapter>,
    elevenlabs: Arc<dyn SpeechAdapter>,
    yandex: Arc<dyn SpeechAdapter>,
}

impl AdapterRegistry {
    pub fn new(
        local: Arc<dyn SpeechAdapter>,
        openai: Arc<dyn SpeechAdapter>,
        elevenlabs: Arc<dyn SpeechAdapter>,
        yandex: Arc<dyn SpeechAdapter>,
    ) -> Result<Self> {
        let registry = Self {
            local,
            openai,
            elevenlabs,
            yandex,
        };
        for provider in Provider::ALL {
            registry.check_slot(provider, registry.get(provider))?;
        }
        Ok(registry)
    }

    pub fn get(&self, provider: Provider) -> &Arc<dyn SpeechAdapter> {
        match provider {
            Provider::Local => &self.local,
            Provider::OpenAi => &self.openai,
            Provider::ElevenLabs => &self.elevenlabs,
            Provider::Yandex => &self.yandex,
        }
    }

    /// Replace the adapter for its own provider.
    pub fn set(&mut self, adapter: Arc<dyn SpeechAdapter>) {
        let slot = match adapter.provider() {
            Provider::Local => &mut self.local,
            Provider::OpenAi => &mut self.openai,
            Provider::ElevenLabs => &mut self.elevenlabs,
            Provider::Yandex => &mut self.yandex,
        };
        *slot = adapter;
    }

    fn check_slot(&self, expected: Provider, adapter: &Arc<dyn SpeechAdapter>) -> Result<()> {
        if adapter.provider() != expected {
            return Err(Error::configuration(format!(
                "adapter for {} registered in the {} slot",
                adapter.provider(),
                expected
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Playback;
    use crate::types::SpeechRequest;
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    #[derive(Debug)]
    struct Named(Provider);

    #[async_trait]
    impl SpeechAdapter for Named {
        fn provider(&self) -> Provider {
            self.0
        }

        async fn synthesize(
            &self,
            _request: &SpeechRequest,
            _cancel: &CancellationToken,
        ) -> Result<Box<dyn Playback>> {
            Err(Error::Cancelled)
        }
    }

    fn named(p: Provider) -> Arc<dyn SpeechAdapter> {
        Arc::new(Named(p))
    }

    #[test]
    fn test_remote_providers_always_supported() {
        for local in [true, false] {
            let reg = CapabilityRegistry::new(local);
            assert!(reg.supports(Provider::OpenAi));
            assert!(reg.supports(Provider::ElevenLabs));
            assert!(reg.supports(Provider::Yandex));
            assert_eq!(reg.supports(Provider::Local), local);
        }
    }

    #[test]
    fn test_supports_is_deterministic() {
        let reg = CapabilityRegistry::new(false);
        for p in Provider::ALL {
            let first = reg.supports(p);
            for _ in 0..10 {
                assert_eq!(reg.supports(p), first);
            }
        }
        assert_eq!(is_provider_supported(Provider::Local), is_provider_supported(Provider::Local));
    }

    #[test]
    fn test_unknown_name_is_unsupported() {
        assert!(!is_provider_name_supported("google"));
        assert!(is_provider_name_supported("openai"));
        assert!(is_provider_name_supported("provider-b"));
    }

    #[test]
    fn test_status_report() {
        let report = CapabilityRegistry::new(false).status_report();
        assert_eq!(report[&Provider::OpenAi], CapabilityStatus::Remote);
        assert!(matches!(report[&Provider::Local], CapabilityStatus::Unavailable { .. }));
        assert_eq!(CapabilityRegistry::new(true).supported_providers().len(), 4);
    }

    #[test]
    fn test_adapter_registry_dispatch_and_slot_check() {
        let mut reg = AdapterRegistry::new(
            named(Provider::Local),
            named(Provider::OpenAi),
            named(Provider::ElevenLabs),
            named(Provider::Yandex),
        )
        .unwrap();
        for p in Provider::ALL {
            assert_eq!(reg.get(p).provider(), p);
        }
        reg.set(named(Provider::Yandex));
        assert_eq!(reg.get(Provider::Yandex).provider(), Provider::Yandex);

        let err = AdapterRegistry::new(
            named(Provider::Local),
            named(Provider::Yandex),
            named(Provider::ElevenLabs),
            named(Provider::Yandex),
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::error_code::ErrorKind::Configuration);
    }
}
