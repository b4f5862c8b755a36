//! Progression state machine for a single attempt.
//!
//! An attempt is either `InProgress(index)` or `Complete`. `Complete` is
//! absorbing: once reached, only a fresh attempt leaves it. Transitions are
//! pure functions from one `AttemptState` value to the next.
//!
//! Index invariant: while in progress `current_step_index < steps.len()`;
//! once complete it equals `steps.len()`. Anything else is a corrupted state
//! and is reported, never clamped.

use serde::Serialize;

use crate::domain::ChallengeDefinition;
use crate::engine::error::{EngineError, Result};

/// Outcome of the most recent submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Passed,
    Failed,
    AlreadyComplete,
}

/// Where an attempt currently stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    InProgress(usize),
    Complete,
}

/// Mutable progress of one learner through one challenge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AttemptState {
    pub current_step_index: usize,
    pub earned_xp: u32,
    pub is_complete: bool,
    pub last_verdict: Option<Verdict>,
}

/// Read-only view used by progress indicators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current_step_index: usize,
    pub earned_xp: u32,
    pub is_complete: bool,
}

/// What an accepted submission did to the attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Index of the step that was just passed.
    pub from_index: usize,
    pub xp_credited: u32,
    pub completed: bool,
}

/// Result of asking the state machine to advance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Advance {
    Moved(AttemptState, Transition),
    /// Nothing left to submit; the state is returned untouched apart from its verdict.
    AlreadyComplete(AttemptState),
}

impl AttemptState {
    pub fn fresh() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_step_index: self.current_step_index,
            earned_xp: self.earned_xp,
            is_complete: self.is_complete,
        }
    }

    /// Validates the index against `challenge` and reports the phase.
    pub fn phase(&self, challenge: &ChallengeDefinition) -> Result<Phase> {
        let steps = challenge.steps.len();
        let index = self.current_step_index;
        match (self.is_complete, index) {
            (true, i) if i == steps => Ok(Phase::Complete),
            (false, i) if i < steps => Ok(Phase::InProgress(i)),
            _ => Err(EngineError::InvalidState {
                index,
                steps,
                complete: self.is_complete,
            }),
        }
    }
}

/// Moves past the current step after an accepted submission.
///
/// The last step completes the attempt and credits the remainder XP in the
/// same transition.
pub fn advance(state: &AttemptState, challenge: &ChallengeDefinition) -> Result<Advance> {
    let index = match state.phase(challenge)? {
        Phase::Complete => {
            let mut next = state.clone();
            next.last_verdict = Some(Verdict::AlreadyComplete);
            return Ok(Advance::AlreadyComplete(next));
        }
        Phase::InProgress(i) => i,
    };

    let is_last = index + 1 == challenge.steps.len();
    let xp_credited = if is_last {
        challenge.final_step_xp()
    } else {
        challenge.per_step_xp()
    };

    let next = AttemptState {
        current_step_index: index + 1,
        earned_xp: state.earned_xp + xp_credited,
        is_complete: is_last,
        last_verdict: Some(Verdict::Passed),
    };
    let transition = Transition {
        from_index: index,
        xp_credited,
        completed: is_last,
    };
    Ok(Advance::Moved(next, transition))
}

/// Records a rejected submission. Index and XP stay where they are.
pub fn reject(state: &AttemptState, challenge: &ChallengeDefinition) -> Result<AttemptState> {
    state.phase(challenge)?;
    let mut next = state.clone();
    next.last_verdict = Some(Verdict::Failed);
    Ok(next)
}
