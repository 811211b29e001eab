/// Task state definitions for tracking crawl progress
///
/// This module defines all states a crawl task can be in and the transitions
/// allowed between them.
use std::fmt;
use thiserror::Error;

/// Represents the current state of a crawl task
///
/// ```text
/// Seeded -> Scheduling -> Fetching -> Extracting -> Enqueuing -> Done
///               |            |            |
///               +------------+------------+---------------------> Done
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    // ===== Active States =====
    /// Task is in the frontier and has not been picked up yet
    Seeded,

    /// Task is waiting for a rate limiter token
    Scheduling,

    /// Page is being fetched
    Fetching,

    /// Content is being resolved and extracted from the fetched page
    Extracting,

    /// Links discovered on the page are being admitted into the frontier
    Enqueuing,

    // ===== Terminal State =====
    /// Task has finished, successfully or not
    Done,
}

/// Error returned for a transition the state machine does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid task state transition: {from} -> {to}")]
pub struct TransitionError {
    pub from: TaskState,
    pub to: TaskState,
}

impl TaskState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: TaskState) -> bool {
        use TaskState::*;

        matches!(
            (self, next),
            (Seeded, Scheduling)
                | (Seeded, Done)
                | (Scheduling, Fetching)
                | (Scheduling, Done)
                | (Fetching, Extracting)
                | (Fetching, Done)
                | (Extracting, Enqueuing)
                | (Extracting, Done)
                | (Enqueuing, Done)
        )
    }

    /// Moves to `next`, or reports the invalid transition
    pub fn transition(self, next: TaskState) -> Result<TaskState, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                from: self,
                to: next,
            })
        }
    }

    /// Returns a short lowercase name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seeded => "seeded",
            Self::Scheduling => "scheduling",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Enqueuing => "enqueuing",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
