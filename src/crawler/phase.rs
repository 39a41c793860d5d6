use serde::Serialize;

use crate::{Result, ScoutError};

/// Lifecycle of one orchestrator run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Initializing,
    Running,
    Closing,
    Done,
}

impl RunPhase {
    /// Whether `self -> next` is a legal step
    ///
    /// `Initializing -> Closing` covers a failed initialization; resources
    /// are still released before the run ends.
    pub fn can_transition_to(self, next: RunPhase) -> bool {
        matches!(
            (self, next),
            (RunPhase::Idle, RunPhase::Initializing)
                | (RunPhase::Initializing, RunPhase::Running)
                | (RunPhase::Initializing, RunPhase::Closing)
                | (RunPhase::Running, RunPhase::Closing)
                | (RunPhase::Closing, RunPhase::Done)
        )
    }

    /// Moves to `next`, rejecting illegal transitions
    pub fn advance(&mut self, next: RunPhase) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(ScoutError::InvalidTransition { from: *self, to: next });
        }
        tracing::debug!("Run phase {:?} -> {:?}", self, next);
        *self = next;
        Ok(())
    }
}
