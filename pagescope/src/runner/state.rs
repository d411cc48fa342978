//! Task kinds and lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of background work. At most one task per kind runs at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Fetching a page over HTTP.
    Fetch,
    /// Running a selector and building a report.
    Extraction,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Extraction => write!(f, "extraction"),
        }
    }
}

/// Lifecycle state of a task slot.
///
/// `Succeeded` and `Failed` are only reachable from `Running`, and the slot
/// returns to `Idle` right after recording them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Nothing running; a new task may start.
    #[default]
    Idle,
    /// A task is in flight.
    Running,
    /// The last task produced a result.
    Succeeded,
    /// The last task failed or was cancelled.
    Failed,
}

impl TaskState {
    /// Returns true if the state represents a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Succeeded | Self::Failed)
                | (Self::Succeeded | Self::Failed, Self::Idle)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_display() {
        assert_eq!(TaskKind::Fetch.to_string(), "fetch");
        assert_eq!(TaskKind::Extraction.to_string(), "extraction");
    }

    #[test]
    fn test_task_state_is_terminal() {
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Idle.is_terminal());
        assert!(!TaskState::Running.is_terminal());
    }

    #[test]
    fn test_terminal_states_only_follow_running() {
        assert!(TaskState::Running.can_transition_to(TaskState::Succeeded));
        assert!(TaskState::Running.can_transition_to(TaskState::Failed));
        assert!(!TaskState::Idle.can_transition_to(TaskState::Succeeded));
        assert!(!TaskState::Idle.can_transition_to(TaskState::Failed));
        assert!(!TaskState::Running.can_transition_to(TaskState::Running));
        assert!(TaskState::Failed.can_transition_to(TaskState::Idle));
    }

    #[test]
    fn test_task_state_serialize() {
        let json = serde_json::to_string(&TaskState::Running).unwrap();
        assert_eq!(json, r#""running""#);

        let kind: TaskKind = serde_json::from_str(r#""extraction""#).unwrap();
        assert_eq!(kind, TaskKind::Extraction);
    }
}
