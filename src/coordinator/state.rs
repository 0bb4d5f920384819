use serde::{Deserialize, Serialize};

use crate::observer::ObserverHandle;

use super::session::Session;

/// Canonical lifecycle state. Exactly one instance exists, owned by the
/// coordinator; everything else only ever sees snapshots.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RecordingState {
    Idle,
    Recording,
    Stopped,
}

impl Default for RecordingState {
    fn default() -> Self {
        RecordingState::Idle
    }
}

/// Read-only view returned by `GET_STATE` and carried in state broadcasts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub state: RecordingState,
    pub step_count: usize,
    pub session: Option<Session>,
}

/// The one bound target of an active recording. Rebinding while a session
/// exists is rejected by the `Idle`-only precondition on start.
#[derive(Clone)]
pub(crate) struct TargetBinding {
    pub target_id: String,
    pub observer: ObserverHandle,
}

/// Coordinator-owned mutable state. Invariant: a session exists iff the
/// state is not `Idle`, and a binding exists iff a session does.
#[derive(Default)]
pub(crate) struct CoordinatorInner {
    pub state: RecordingState,
    pub session: Option<Session>,
    pub binding: Option<TargetBinding>,
}

impl CoordinatorInner {
    pub fn clear(&mut self) {
        self.state = RecordingState::Idle;
        self.session = None;
        self.binding = None;
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            state: self.state,
            step_count: self
                .session
                .as_ref()
                .map(|session| session.steps.len())
                .unwrap_or(0),
            session: self.session.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_is_idle_and_empty() {
        let inner = CoordinatorInner::default();
        let snapshot = inner.snapshot();
        assert_eq!(snapshot.state, RecordingState::Idle);
        assert_eq!(snapshot.step_count, 0);
        assert!(snapshot.session.is_none());
    }

    #[test]
    fn state_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&RecordingState::Recording).unwrap(),
            "\"recording\""
        );
    }
}
