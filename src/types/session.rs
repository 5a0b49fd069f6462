//! Playback session state machine and observable events.

use super::Provider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

/// Synthetic identifier of one `speak()` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Session lifecycle.
///
/// ```text
/// Idle -> Loading -> Playing -> {Completed | Stopped | Errored} -> Idle
///            |                              ^
///            +------> {Stopped | Errored} --+
/// ```
///
/// `Idle` is reported when the service holds no session at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Loading,
    Playing,
    Completed,
    Stopped,
    Errored,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped | Self::Errored)
    }

    /// Loading and Playing are the states in which a session is "active".
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Loading | Self::Playing)
    }

    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Idle, Loading)
                | (Loading, Playing)
                | (Loading, Stopped)
                | (Loading, Errored)
                | (Playing, Completed)
                | (Playing, Stopped)
                | (Playing, Errored)
                | (Completed, Idle)
                | (Stopped, Idle)
                | (Errored, Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub session: SessionId,
    pub provider: Provider,
    pub state: SessionState,
    pub at: SystemTime,
}

/// Snapshot of the session the service currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    pub id: SessionId,
    pub provider: Provider,
    pub state: SessionState,
    pub created_at: SystemTime,
}

/// How a successful `speak()` ended.
///
/// Both variants are successes: a stop requested by the caller is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakOutcome {
    /// Playback ran to its end.
    Completed,
    /// `stop()` or a newer `speak()` ended the session early.
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(Idle.can_transition_to(Loading));
        assert!(Loading.can_transition_to(Playing));
        assert!(Playing.can_transition_to(Completed));
        assert!(Completed.can_transition_to(Idle));
    }

    #[test]
    fn test_loading_may_end_early() {
        assert!(Loading.can_transition_to(Stopped));
        assert!(Loading.can_transition_to(Errored));
        assert!(!Loading.can_transition_to(Completed));
    }

    #[test]
    fn test_terminal_states_are_not_revisited() {
        for t in [Completed, Stopped, Errored] {
            assert!(t.is_terminal());
            for next in [Loading, Playing, Completed, Stopped, Errored] {
                assert!(!t.can_transition_to(next), "{t} -> {next}");
            }
        }
    }

    #[test]
    fn test_active_states() {
        assert!(Loading.is_active());
        assert!(Playing.is_active());
        assert!(!Idle.is_active());
        assert!(!Stopped.is_active());
    }
}
