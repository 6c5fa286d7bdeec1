//! Detachment run state machine
//!
//! NOT_STARTED → CLASSIFIED → RECORDED → STAGED → SIGNED → DONE, with
//! FAILED reachable from every non-terminal state and three successful
//! early exits: SKIPPED_NOT_DIST_MODULE and SKIPPED_NO_STAGING_URL before
//! classification, SKIPPED_EMPTY_SET right after it.

mod detach_state;

pub use detach_state::{DetachProgress, DetachState, StateChange};

/// Check if a state is terminal (no further transitions possible)
pub trait TerminalState {
    fn is_terminal(&self) -> bool;
}
