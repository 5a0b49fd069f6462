//! Shared fixtures for integration tests: a scripted speech engine, a
//! recording audio sink, and helpers for building services against them.

#![allow(dead_code)]

pub mod mock_server;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tts_lib_rust::audio::{AudioBuffer, AudioSink, Playback};
use tts_lib_rust::engine::{SpeechEngine, Utterance};
use tts_lib_rust::{
    Error, Provider, Result, SessionEvent, SessionState, TtsConfig, TtsService,
};

/// How one scripted utterance behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Script {
    /// Plays for the given time, then completes.
    Plays(Duration),
    /// Plays until cancelled.
    Hangs,
    /// `utter` itself fails.
    FailsToPrepare,
    /// `start` fails.
    FailsToStart,
    /// Output dies midway.
    FailsWhilePlaying,
}

/// Observations shared between a fake playback and the test.
#[derive(Debug, Default)]
pub struct PlaybackProbe {
    pub started: AtomicUsize,
    pub cancelled: AtomicUsize,
    pub finished: AtomicUsize,
}

impl PlaybackProbe {
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

pub struct FakePlayback {
    provider: Provider,
    script: Script,
    probe: Arc<PlaybackProbe>,
}

#[async_trait]
impl Playback for FakePlayback {
    async fn start(&mut self) -> Result<()> {
        if self.script == Script::FailsToStart {
            return Err(Error::playback(self.provider, "output device busy"));
        }
        self.probe.started.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn finished(&mut self) -> Result<()> {
        match self.script {
            Script::Plays(d) => {
                tokio::time::sleep(d).await;
                self.probe.finished.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Script::Hangs => std::future::pending().await,
            _ => Err(Error::playback(self.provider, "output stream died")),
        }
    }

    async fn cancel(&mut self) {
        self.probe.cancelled.fetch_add(1, Ordering::SeqCst);
    }
}

/// Speech engine that follows a queue of scripts, then a default.
#[derive(Debug)]
pub struct FakeEngine {
    available: bool,
    default: Script,
    queue: Mutex<VecDeque<Script>>,
    pub utterances: Mutex<Vec<Utterance>>,
    pub probe: Arc<PlaybackProbe>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            available: true,
            default: Script::Plays(Duration::from_millis(10)),
            queue: Mutex::new(VecDeque::new()),
            utterances: Mutex::new(Vec::new()),
            probe: Arc::new(PlaybackProbe::default()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn then(self, script: Script) -> Self {
        self.queue.lock().unwrap().push_back(script);
        self
    }

    pub fn utterance_count(&self) -> usize {
        self.utterances.lock().unwrap().len()
    }
}

#[async_trait]
impl SpeechEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn voices(&self) -> Result<Vec<String>> {
        Ok(vec!["fake-en".to_string(), "fake-ru".to_string()])
    }

    fn utter(&self, utterance: Utterance) -> Result<Box<dyn Playback>> {
        self.utterances.lock().unwrap().push(utterance);
        let script = self.queue.lock().unwrap().pop_front().unwrap_or(self.default);
        if script == Script::FailsToPrepare {
            return Err(Error::configuration("engine process could not be spawned"));
        }
        Ok(Box::new(FakePlayback {
            provider: Provider::Local,
            script,
            probe: self.probe.clone(),
        }))
    }
}

/// Audio sink that records every buffer it is asked to play and plays
/// each one by a queue of scripts, then a default.
#[derive(Debug)]
pub struct RecordingSink {
    default: Script,
    queue: Mutex<VecDeque<Script>>,
    pub buffers: Mutex<Vec<(Provider, AudioBuffer)>>,
    pub probe: Arc<PlaybackProbe>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::with_script(Script::Plays(Duration::from_millis(5)))
    }

    pub fn with_script(script: Script) -> Self {
        Self {
            default: script,
            queue: Mutex::new(VecDeque::new()),
            buffers: Mutex::new(Vec::new()),
            probe: Arc::new(PlaybackProbe::default()),
        }
    }

    pub fn then(self, script: Script) -> Self {
        self.queue.lock().unwrap().push_back(script);
        self
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.lock().unwrap().len()
    }
}

impl AudioSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn open(&self, provider: Provider, buffer: AudioBuffer) -> Result<Box<dyn Playback>> {
        self.buffers.lock().unwrap().push((provider, buffer));
        let script = self.queue.lock().unwrap().pop_front().unwrap_or(self.default);
        Ok(Box::new(FakePlayback {
            provider,
            script,
            probe: self.probe.clone(),
        }))
    }
}

/// A minimal MP3 payload (ID3 header) that the decoder accepts.
pub const MP3_BYTES: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00fake-frames";

/// Config whose remote endpoints all point at `base_url`.
pub fn config_for(base_url: &str) -> TtsConfig {
    let mut config = TtsConfig::default();
    config.openai.base_url = base_url.to_string();
    config.elevenlabs.base_url = base_url.to_string();
    config.yandex.base_url = base_url.to_string();
    config
}

pub fn service(engine: Arc<FakeEngine>, sink: Arc<RecordingSink>, config: TtsConfig) -> TtsService {
    TtsService::builder()
        .config(config)
        .engine(engine)
        .sink(sink)
        .build()
        .expect("service builds")
}

pub fn local_service(engine: Arc<FakeEngine>) -> TtsService {
    service(engine, Arc::new(RecordingSink::new()), TtsConfig::default())
}

/// Poll until the service reports `state`, failing after a second.
pub async fn wait_for_state(tts: &TtsService, state: SessionState) {
    tokio::time::timeout(Duration::from_secs(1), async {
        while tts.state() != state {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("service never reached {state}"));
}

/// Every event already sitting in the channel.
pub fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn states(events: &[SessionEvent]) -> Vec<SessionState> {
    events.iter().map(|e| e.state).collect()
}
