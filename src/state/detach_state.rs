use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TerminalState;
use crate::error::{DetachError, DetachResult};

/// Stage reached by a detachment run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DetachState {
    NotStarted,
    /// Detached set computed
    Classified,
    /// Digest map computed, detached set removed from the attached
    /// artifacts, sha1.properties written
    Recorded,
    /// Detached files copied into the working directory
    Staged,
    /// Sidecar checksum files written
    Signed,
    Done,
    Failed,
    SkippedNotDistModule,
    SkippedNoStagingUrl,
    SkippedEmptySet,
}

impl TerminalState for DetachState {
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            DetachState::Done
                | DetachState::Failed
                | DetachState::SkippedNotDistModule
                | DetachState::SkippedNoStagingUrl
                | DetachState::SkippedEmptySet
        )
    }
}

impl DetachState {
    /// Check if transition from this state to target is valid
    pub fn can_transition_to(&self, target: DetachState) -> bool {
        use DetachState::*;

        match (self, target) {
            (NotStarted, SkippedNotDistModule) => true,
            (NotStarted, SkippedNoStagingUrl) => true,
            (NotStarted, Classified) => true,

            (Classified, SkippedEmptySet) => true,
            (Classified, Recorded) => true,
            (Recorded, Staged) => true,
            (Staged, Signed) => true,
            (Signed, Done) => true,

            (from, Failed) => !from.is_terminal(),

            _ => false,
        }
    }

    /// Successful terminal state that skipped the pipeline
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            DetachState::SkippedNotDistModule
                | DetachState::SkippedNoStagingUrl
                | DetachState::SkippedEmptySet
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetachState::NotStarted => "NOT_STARTED",
            DetachState::Classified => "CLASSIFIED",
            DetachState::Recorded => "RECORDED",
            DetachState::Staged => "STAGED",
            DetachState::Signed => "SIGNED",
            DetachState::Done => "DONE",
            DetachState::Failed => "FAILED",
            DetachState::SkippedNotDistModule => "SKIPPED_NOT_DIST_MODULE",
            DetachState::SkippedNoStagingUrl => "SKIPPED_NO_STAGING_URL",
            DetachState::SkippedEmptySet => "SKIPPED_EMPTY_SET",
        }
    }
}

/// One recorded transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateChange {
    pub state: DetachState,
    pub at: DateTime<Utc>,
}

/// Current state plus the transitions taken to reach it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetachProgress {
    pub state: DetachState,
    pub history: Vec<StateChange>,
}

impl Default for DetachProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl DetachProgress {
    /// Create a run in NOT_STARTED
    pub fn new() -> Self {
        Self {
            state: DetachState::NotStarted,
            history: vec![StateChange {
                state: DetachState::NotStarted,
                at: Utc::now(),
            }],
        }
    }

    /// Transition to a new state
    pub fn transition(&mut self, new_state: DetachState) -> DetachResult<()> {
        if !self.state.can_transition_to(new_state) {
            return Err(DetachError::InvalidTransition {
                from: self.state,
                to: new_state,
            });
        }

        self.state = new_state;
        self.history.push(StateChange {
            state: new_state,
            at: Utc::now(),
        });
        Ok(())
    }

    /// Mark the run failed unless it already finished
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = DetachState::Failed;
            self.history.push(StateChange {
                state: DetachState::Failed,
                at: Utc::now(),
            });
        }
    }

    /// States visited, in order
    pub fn visited(&self) -> Vec<DetachState> {
        self.history.iter().map(|c| c.state).collect()
    }
}
