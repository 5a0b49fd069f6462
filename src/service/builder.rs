//! Builder for [`TtsService`].

use super::TtsService;
use crate::adapters::{
    http_client, ElevenLabsAdapter, ElevenLabsWire, LocalAdapter, OpenAiAdapter, OpenAiWire,
    SpeechAdapter, YandexAdapter, YandexWire,
};
use crate::audio::{AudioSink, CommandSink};
use crate::config::TtsConfig;
use crate::engine::{CommandEngine, SpeechEngine};
use crate::registry::{AdapterRegistry, CapabilityRegistry};
use crate::Result;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use tracing::debug;

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Assembles a [`TtsService`] from configuration, a host engine, an audio
/// sink and optional adapter overrides.
pub struct TtsServiceBuilder {
    config: Option<TtsConfig>,
    engine: Option<Arc<dyn SpeechEngine>>,
    sink: Option<Arc<dyn AudioSink>>,
    adapters: Vec<Arc<dyn SpeechAdapter>>,
    event_capacity: usize,
}

impl TtsServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            engine: None,
            sink: None,
            adapters: Vec::new(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Use `config` as-is. Without one, [`TtsConfig::from_env`] is used.
    pub fn config(mut self, config: TtsConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Host speech engine. Defaults to the first command-line engine found.
    pub fn engine(mut self, engine: Arc<dyn SpeechEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Audio output for remote providers. Defaults to a host player program.
    pub fn sink(mut self, sink: Arc<dyn AudioSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replace the adapter for `adapter.provider()`.
    pub fn adapter(mut self, adapter: Arc<dyn SpeechAdapter>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Buffer size of the session event channel.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> Result<TtsService> {
        let config = self.config.unwrap_or_else(TtsConfig::from_env);
        config.validate()?;

        let engine: Arc<dyn SpeechEngine> = match self.engine {
            Some(engine) => engine,
            None => Arc::new(CommandEngine::detect(config.engine.as_deref())),
        };
        let sink: Arc<dyn AudioSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(CommandSink::detect(config.player.as_deref())),
        };
        let client = http_client(&config)?;

        let mut adapters = AdapterRegistry::new(
            Arc::new(LocalAdapter::new(engine.clone())),
            Arc::new(OpenAiAdapter::new(
                OpenAiWire::new(config.openai.clone()),
                client.clone(),
                sink.clone(),
            )),
            Arc::new(ElevenLabsAdapter::new(
                ElevenLabsWire::new(config.elevenlabs.clone()),
                client.clone(),
                sink.clone(),
            )),
            Arc::new(YandexAdapter::new(
                YandexWire::new(config.yandex.clone()),
                client,
                sink.clone(),
            )),
        )?;
        for adapter in self.adapters {
            debug!(provider = %adapter.provider(), adapter = ?adapter, "overriding adapter");
            adapters.set(adapter);
        }

        let capabilities = CapabilityRegistry::for_engine(engine.as_ref());
        debug!(
            engine = engine.name(),
            sink = sink.name(),
            local = capabilities.supports(crate::types::Provider::Local),
            local_fallback = config.local_fallback,
            "tts service built"
        );

        let (events, _) = broadcast::channel(self.event_capacity);
        Ok(TtsService {
            adapters,
            capabilities,
            engine,
            local_fallback: config.local_fallback,
            current: Mutex::new(None),
            gate: tokio::sync::Mutex::new(()),
            events,
        })
    }
}

impl Default for TtsServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
