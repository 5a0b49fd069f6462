//! 语音服务：单会话编排器，统一 speak/stop 契约。
//!
//! The TTS orchestrator.
//!
//! [`TtsService`] owns at most one playback session. `speak()` validates,
//! preempts whatever is playing, picks the adapter for the requested provider
//! and drives the session through
//! `Loading -> Playing -> {Completed | Stopped | Errored} -> Idle`.
//! `stop()` cancels the current session, which resolves its `speak()` call
//! successfully with [`SpeakOutcome::Stopped`].
//!
//! Construct one service per consuming context and share it by reference (or
//! `Arc`); there is no global instance.
//!
//! ```rust,no_run
//! use tts_lib_rust::{RawSpeechRequest, TtsService};
//!
//! # async fn run() -> tts_lib_rust::Result<()> {
//! let tts = TtsService::builder().build()?;
//! tts.speak(RawSpeechRequest::new("Hello", "local")).await?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod session;

pub use builder::TtsServiceBuilder;

use crate::adapters::SpeechAdapter;
use crate::engine::SpeechEngine;
use crate::registry::{AdapterRegistry, CapabilityRegistry};
use crate::types::{
    PlaybackSession, Provider, RawSpeechRequest, SessionEvent, SessionState, SpeakOutcome,
    SpeechRequest,
};
use crate::{validation, Error, Result};
use session::{lock, SessionGuard, Slot};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Single-session text-to-speech service.
pub struct TtsService {
    adapters: AdapterRegistry,
    capabilities: CapabilityRegistry,
    engine: Arc<dyn SpeechEngine>,
    local_fallback: bool,
    current: Slot,
    /// Serializes preemption and session registration across `speak()` calls.
    gate: tokio::sync::Mutex<()>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for TtsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtsService")
            .field("capabilities", &self.capabilities)
            .field("engine", &self.engine.name())
            .field("local_fallback", &self.local_fallback)
            .field("state", &self.state())
            .finish()
    }
}

impl TtsService {
    pub fn builder() -> TtsServiceBuilder {
        TtsServiceBuilder::new()
    }

    /// Speak `request`, returning once the speech act has ended.
    ///
    /// Any session still playing is stopped and cleared before this one starts
    /// loading. Returns `Ok(Completed)` when playback ran to its end and
    /// `Ok(Stopped)` when `stop()` or a newer `speak()` ended it; every failure
    /// is one of the normalized kinds, and the service is idle again by the
    /// time the error is returned.
    pub async fn speak(&self, request: RawSpeechRequest) -> Result<SpeakOutcome> {
        let request = validation::validate(request)?;
        let provider = request.provider();

        let mut session = {
            let _gate = self.gate.lock().await;
            self.preempt().await;
            if !self.capabilities.supports(provider) {
                return Err(Error::unsupported(
                    provider.as_str(),
                    "the host exposes no speech engine",
                ));
            }
            SessionGuard::begin(&self.current, &self.events, provider)
        };
        info!(session = %session.id(), provider = %provider, "speech session started");

        let mut served_by = provider;
        let mut result = drive(&mut session, self.adapters.get(provider).as_ref(), &request).await;

        // Only a session that never reached the speaker can switch backends.
        let fall_back = match &result {
            Err(err) if session.state() == SessionState::Loading && self.should_fall_back(provider, err) => {
                warn!(
                    session = %session.id(),
                    provider = %provider,
                    error = %err,
                    "remote synthesis failed; falling back to local engine"
                );
                true
            }
            _ => false,
        };
        if fall_back {
            served_by = Provider::Local;
            let local = request.for_local_engine();
            result = drive(&mut session, self.adapters.get(Provider::Local).as_ref(), &local).await;
        }

        match result {
            Ok(outcome) => {
                session.transition(match outcome {
                    SpeakOutcome::Completed => SessionState::Completed,
                    SpeakOutcome::Stopped => SessionState::Stopped,
                });
                info!(session = %session.id(), provider = %served_by, outcome = ?outcome, "speech session finished");
                Ok(outcome)
            }
            Err(Error::Cancelled) => {
                session.transition(SessionState::Stopped);
                info!(session = %session.id(), provider = %served_by, "speech session stopped while loading");
                Ok(SpeakOutcome::Stopped)
            }
            Err(err) => {
                let err = err.normalize(served_by);
                session.transition(SessionState::Errored);
                warn!(
                    session = %session.id(),
                    provider = %served_by,
                    kind = err.kind().name(),
                    error = %err,
                    "speech session failed"
                );
                Err(err)
            }
        }
    }

    /// Cancel the current session, if any. Idempotent and non-blocking; the
    /// pending `speak()` resolves with [`SpeakOutcome::Stopped`].
    pub fn stop(&self) {
        let current = lock(&self.current);
        if let Some(active) = current.as_ref() {
            if !active.cancel.is_cancelled() {
                info!(session = %active.info.id, state = %active.info.state, "stop requested");
                active.cancel.cancel();
            }
        }
    }

    /// Resolve once the service holds no session.
    pub async fn wait_idle(&self) {
        let cleared = lock(&self.current).as_ref().map(|s| s.cleared.clone());
        if let Some(mut cleared) = cleared {
            let _ = cleared.wait_for(|done| *done).await;
        }
    }

    /// State of the current session, or `Idle` when there is none.
    pub fn state(&self) -> SessionState {
        lock(&self.current)
            .as_ref()
            .map(|s| s.info.state)
            .unwrap_or(SessionState::Idle)
    }

    pub fn is_speaking(&self) -> bool {
        self.state() == SessionState::Playing
    }

    pub fn current_session(&self) -> Option<PlaybackSession> {
        lock(&self.current).as_ref().map(|s| s.info.clone())
    }

    /// Every session transition, ending with `Idle` when a session is cleared.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn capabilities(&self) -> &CapabilityRegistry {
        &self.capabilities
    }

    pub fn is_provider_supported(&self, provider: Provider) -> bool {
        self.capabilities.supports(provider)
    }

    /// Voices offered by the host engine.
    pub async fn local_voices(&self) -> Result<Vec<String>> {
        if !self.capabilities.supports(Provider::Local) {
            return Ok(Vec::new());
        }
        self.engine.voices().await
    }

    /// Cancel the current session and wait until it has been cleared.
    async fn preempt(&self) {
        let previous = lock(&self.current)
            .as_ref()
            .map(|s| (s.info.id, s.cancel.clone(), s.cleared.clone()));
        if let Some((id, cancel, mut cleared)) = previous {
            info!(session = %id, "preempting active session");
            cancel.cancel();
            let _ = cleared.wait_for(|done| *done).await;
        }
    }

    fn should_fall_back(&self, provider: Provider, err: &Error) -> bool {
        self.local_fallback
            && provider.is_remote()
            && !err.is_cancelled()
            && self.capabilities.supports(Provider::Local)
    }
}

/// Synthesize, start, and await one handle under the session's token.
async fn drive(
    session: &mut SessionGuard<'_>,
    adapter: &dyn SpeechAdapter,
    request: &SpeechRequest,
) -> Result<SpeakOutcome> {
    let cancel = session.cancel_token().clone();

    let mut handle = adapter.synthesize(request, &cancel).await?;
    if cancel.is_cancelled() {
        handle.cancel().await;
        return Ok(SpeakOutcome::Stopped);
    }

    if let Err(err) = handle.start().await {
        handle.cancel().await;
        return Err(err);
    }
    session.transition(SessionState::Playing);

    let finished = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        done = handle.finished() => Some(done),
    };
    match finished {
        None => {
            handle.cancel().await;
            Ok(SpeakOutcome::Stopped)
        }
        Some(done) => done.map(|()| SpeakOutcome::Completed),
    }
}
