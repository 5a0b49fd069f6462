//! Session bookkeeping: the single slot and the guard that owns it.

use crate::types::{PlaybackSession, Provider, SessionEvent, SessionId, SessionState};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// What the service knows about the session it currently holds.
#[derive(Debug)]
pub(crate) struct ActiveSession {
    pub(crate) info: PlaybackSession,
    pub(crate) cancel: CancellationToken,
    /// Flips to `true` once the session has been removed from the slot.
    pub(crate) cleared: watch::Receiver<bool>,
}

pub(crate) type Slot = Mutex<Option<ActiveSession>>;

/// Lock the slot. Critical sections never panic, but a poisoned lock still
/// holds consistent data, so recover rather than propagate.
pub(crate) fn lock(slot: &Slot) -> MutexGuard<'_, Option<ActiveSession>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns one session for the duration of a `speak()` call.
///
/// Dropping the guard always clears the slot and reports `Idle`, whether the
/// call returned normally or its future was dropped mid-flight.
pub(crate) struct SessionGuard<'a> {
    slot: &'a Slot,
    events: &'a broadcast::Sender<SessionEvent>,
    id: SessionId,
    provider: Provider,
    state: SessionState,
    cancel: CancellationToken,
    cleared: watch::Sender<bool>,
}

impl<'a> SessionGuard<'a> {
    /// Register a new session in the (empty) slot and move it to `Loading`.
    pub(crate) fn begin(
        slot: &'a Slot,
        events: &'a broadcast::Sender<SessionEvent>,
        provider: Provider,
    ) -> Self {
        let id = SessionId::new();
        let cancel = CancellationToken::new();
        let (cleared_tx, cleared_rx) = watch::channel(false);
        {
            let mut current = lock(slot);
            if let Some(stale) = current.as_ref() {
                warn!(session = %stale.info.id, "replacing a session that was never cleared");
                stale.cancel.cancel();
            }
            *current = Some(ActiveSession {
                info: PlaybackSession {
                    id,
                    provider,
                    state: SessionState::Loading,
                    created_at: SystemTime::now(),
                },
                cancel: cancel.clone(),
                cleared: cleared_rx,
            });
        }
        let mut guard = Self {
            slot,
            events,
            id,
            provider,
            state: SessionState::Idle,
            cancel,
            cleared: cleared_tx,
        };
        guard.transition(SessionState::Loading);
        guard
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Move to `next` if the state machine allows it; repeated states are no-ops.
    pub(crate) fn transition(&mut self, next: SessionState) {
        if self.state == next {
            return;
        }
        if !self.state.can_transition_to(next) {
            warn!(session = %self.id, from = %self.state, to = %next, "ignoring invalid session transition");
            return;
        }
        self.state = next;
        if let Some(active) = lock(self.slot).as_mut() {
            if active.info.id == self.id {
                active.info.state = next;
            }
        }
        debug!(session = %self.id, provider = %self.provider, state = %next, "session transition");
        self.emit(next);
    }

    fn emit(&self, state: SessionState) {
        // No subscribers is fine.
        let _ = self.events.send(SessionEvent {
            session: self.id,
            provider: self.provider,
            state,
            at: SystemTime::now(),
        });
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if self.state.is_active() {
            // speak() future dropped before it finished
            self.cancel.cancel();
            self.transition(SessionState::Stopped);
        }
        {
            let mut current = lock(self.slot);
            if current.as_ref().map(|s| s.info.id) == Some(self.id) {
                *current = None;
            }
        }
        self.emit(SessionState::Idle);
        let _ = self.cleared.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> broadcast::Sender<SessionEvent> {
        broadcast::channel(16).0
    }

    fn drain(rx: &mut broadcast::Receiver<SessionEvent>) -> Vec<SessionState> {
        let mut states = Vec::new();
        while let Ok(event) = rx.try_recv() {
            states.push(event.state);
        }
        states
    }

    #[test]
    fn test_begin_registers_loading_session() {
        let slot = Slot::default();
        let events = channel();
        let mut rx = events.subscribe();

        let guard = SessionGuard::begin(&slot, &events, Provider::Local);

        let current = lock(&slot);
        let active = current.as_ref().unwrap();
        assert_eq!(active.info.id, guard.id());
        assert_eq!(active.info.state, SessionState::Loading);
        assert_eq!(drain(&mut rx), vec![SessionState::Loading]);
    }

    #[test]
    fn test_drop_of_active_session_stops_and_clears() {
        let slot = Slot::default();
        let events = channel();
        let mut rx = events.subscribe();

        let guard = SessionGuard::begin(&slot, &events, Provider::OpenAi);
        let token = guard.cancel_token().clone();
        let mut cleared = lock(&slot).as_ref().unwrap().cleared.clone();
        drop(guard);

        assert!(token.is_cancelled());
        assert!(lock(&slot).is_none());
        assert_eq!(
            drain(&mut rx),
            vec![SessionState::Loading, SessionState::Stopped, SessionState::Idle]
        );
        tokio_test::block_on(async {
            cleared.wait_for(|done| *done).await.unwrap();
        });
    }

    #[test]
    fn test_invalid_transition_is_ignored() {
        let slot = Slot::default();
        let events = channel();
        let mut rx = events.subscribe();

        let mut guard = SessionGuard::begin(&slot, &events, Provider::Local);
        guard.transition(SessionState::Completed);
        assert_eq!(guard.state(), SessionState::Loading);
        guard.transition(SessionState::Playing);
        guard.transition(SessionState::Playing);
        guard.transition(SessionState::Completed);
        drop(guard);

        assert_eq!(
            drain(&mut rx),
            vec![
                SessionState::Loading,
                SessionState::Playing,
                SessionState::Completed,
                SessionState::Idle
            ]
        );
    }
}
