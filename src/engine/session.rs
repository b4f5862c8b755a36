//! One attempt at one challenge: check, advance, map, and report a verdict.
//!
//! `Session::submit` takes `&mut self`, so one submission at a time per
//! attempt is enforced by the borrow checker. Callers sharing a session
//! across tasks wrap it in a mutex.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::{ChallengeDefinition, StepDefinition};
use crate::engine::checker::check;
use crate::engine::error::Result;
use crate::engine::progression::{self, Advance, AttemptState, Phase, Snapshot, Verdict};
use crate::engine::visualization::{EventMapper, VisualizationEvent};

/// Why a submission was or wasn't accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
  Passed,
  TestsFailed,
  /// Nothing left to submit. Distinct from a wrong answer.
  ChallengeAlreadyComplete,
}

/// Structured result of one submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionVerdict {
  pub accepted: bool,
  pub reason: VerdictReason,
  pub xp_delta: u32,
  pub visualization_event: Option<VisualizationEvent>,
  pub is_challenge_complete: bool,
}

impl SubmissionVerdict {
  fn failed() -> Self {
    Self {
      accepted: false,
      reason: VerdictReason::TestsFailed,
      xp_delta: 0,
      visualization_event: None,
      is_challenge_complete: false,
    }
  }

  fn already_complete() -> Self {
    Self {
      accepted: false,
      reason: VerdictReason::ChallengeAlreadyComplete,
      xp_delta: 0,
      visualization_event: None,
      is_challenge_complete: true,
    }
  }
}

#[derive(Clone, Debug)]
pub struct Session {
  challenge: Arc<ChallengeDefinition>,
  state: AttemptState,
  mapper: EventMapper,
}

impl Session {
  /// Starts a fresh attempt. Fails fast on a definition the engine can't run.
  pub fn reset_attempt(challenge: Arc<ChallengeDefinition>) -> Result<Self> {
    challenge.validate()?;
    let mapper = EventMapper::new(challenge.initial_nodes);
    Ok(Self { challenge, state: AttemptState::fresh(), mapper })
  }

  /// Back to step 0 with no XP, same definition.
  pub fn reset(&mut self) {
    self.state = AttemptState::fresh();
    self.mapper = EventMapper::new(self.challenge.initial_nodes);
  }

  pub fn challenge(&self) -> &ChallengeDefinition {
    &self.challenge
  }

  pub fn state(&self) -> &AttemptState {
    &self.state
  }

  pub fn snapshot(&self) -> Snapshot {
    self.state.snapshot()
  }

  pub fn node_count(&self) -> usize {
    self.mapper.node_count()
  }

  /// The step the learner is on, or `None` once complete.
  pub fn current_step(&self) -> Option<&StepDefinition> {
    match self.state.phase(&self.challenge) {
      Ok(Phase::InProgress(i)) => self.challenge.steps.get(i),
      _ => None,
    }
  }

  pub fn submit(&mut self, source: &str) -> Result<SubmissionVerdict> {
    let challenge = Arc::clone(&self.challenge);

    let index = match self.state.phase(&challenge)? {
      Phase::Complete => {
        self.state.last_verdict = Some(Verdict::AlreadyComplete);
        debug!(target: "attempt", challenge_id = %challenge.id, "Submission after completion refused");
        return Ok(SubmissionVerdict::already_complete());
      }
      Phase::InProgress(i) => i,
    };
    let step = &challenge.steps[index];

    if !check(source, step) {
      self.state = progression::reject(&self.state, &challenge)?;
      debug!(target: "attempt", challenge_id = %challenge.id, step_id = step.id, source_len = source.len(), "Submission rejected");
      return Ok(SubmissionVerdict::failed());
    }

    let (next, transition) = match progression::advance(&self.state, &challenge)? {
      Advance::Moved(next, transition) => (next, transition),
      Advance::AlreadyComplete(next) => {
        self.state = next;
        return Ok(SubmissionVerdict::already_complete());
      }
    };
    self.state = next;
    let visualization_event = self.mapper.map_event(step, Some(&transition));

    debug!(
      target: "attempt",
      challenge_id = %challenge.id,
      step_id = step.id,
      step_index = transition.from_index,
      xp = transition.xp_credited,
      completed = transition.completed,
      "Step accepted"
    );

    Ok(SubmissionVerdict {
      accepted: true,
      reason: VerdictReason::Passed,
      xp_delta: transition.xp_credited,
      visualization_event,
      is_challenge_complete: transition.completed,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::test_support::challenge;
  use crate::domain::VisualizationKind;
  use crate::engine::error::{ConfigError, EngineError};
  use crate::engine::visualization::RenderAction;
  use crate::seeds::linked_list_intro;

  fn session(steps: usize, xp: u32) -> Session {
    Session::reset_attempt(Arc::new(challenge(steps, xp))).unwrap()
  }

  #[test]
  fn xp_deltas_sum_to_reward() {
    let mut s = session(3, 100);
    let deltas: Vec<u32> = (1..=3)
      .map(|i| s.submit(&format!("my step{i} code")).unwrap().xp_delta)
      .collect();
    assert_eq!(deltas, vec![33, 33, 34]);
    assert!(s.snapshot().is_complete);
    assert_eq!(s.snapshot().earned_xp, 100);
  }

  #[test]
  fn rejection_leaves_state_untouched() {
    let mut s = session(5, 100);
    s.submit("step1").unwrap();
    let before = s.snapshot();
    let v = s.submit("nothing relevant").unwrap();
    assert_eq!(v, SubmissionVerdict::failed());
    assert_eq!(s.snapshot(), before);
    assert_eq!(s.snapshot().current_step_index, 1);
    assert_eq!(s.state().last_verdict, Some(Verdict::Failed));
  }

  #[test]
  fn only_current_step_is_checked() {
    let mut s = session(3, 30);
    let v = s.submit("step2").unwrap();
    assert!(!v.accepted);
    assert_eq!(s.snapshot().current_step_index, 0);
  }

  #[test]
  fn submit_after_completion_is_terminal_not_failed() {
    let mut s = session(1, 50);
    assert!(s.submit("step1").unwrap().is_challenge_complete);
    let done = s.snapshot();
    for code in ["step1", "", "garbage"] {
      let v = s.submit(code).unwrap();
      assert_eq!(v.reason, VerdictReason::ChallengeAlreadyComplete);
      assert!(v.is_challenge_complete);
      assert_eq!(v.xp_delta, 0);
      assert_eq!(s.snapshot(), done);
    }
    assert!(s.current_step().is_none());
  }

  #[test]
  fn snapshot_is_idempotent() {
    let mut s = session(2, 20);
    s.submit("step1").unwrap();
    assert_eq!(s.snapshot(), s.snapshot());
  }

  #[test]
  fn progress_never_decreases() {
    let mut s = session(4, 99);
    let mut last = s.snapshot();
    for code in ["x", "step1", "step1", "step2", "", "step3", "step4", "step4"] {
      s.submit(code).unwrap();
      let now = s.snapshot();
      assert!(now.earned_xp >= last.earned_xp);
      assert!(now.current_step_index >= last.current_step_index);
      last = now;
    }
    assert_eq!(last.earned_xp, 99);
  }

  #[test]
  fn empty_patterns_fail_at_reset() {
    let mut c = challenge(2, 100);
    c.steps[1].acceptance_patterns.clear();
    let err = Session::reset_attempt(Arc::new(c)).unwrap_err();
    assert_eq!(err, EngineError::Config(ConfigError::EmptyPatterns { step_id: 2 }));
  }

  #[test]
  fn zero_steps_fail_at_reset() {
    let err = Session::reset_attempt(Arc::new(challenge(0, 100))).unwrap_err();
    assert!(matches!(err, EngineError::Config(ConfigError::NoSteps { .. })));
  }

  #[test]
  fn corrupted_state_surfaces_on_submit() {
    let mut s = session(3, 30);
    s.state = AttemptState { current_step_index: 9, ..AttemptState::fresh() };
    let err = s.submit("step1").unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { index: 9, steps: 3, .. }));
    assert!(s.current_step().is_none());
  }

  #[test]
  fn event_uses_pre_transition_step() {
    let mut c = challenge(2, 20);
    c.steps[0].visualization_kind = VisualizationKind::NodeCreate;
    let mut s = Session::reset_attempt(Arc::new(c)).unwrap();
    let e = s.submit("step1").unwrap().visualization_event.unwrap();
    assert_eq!(e.step_id, 1);
    assert_eq!(e.action, RenderAction::NodeCreate { node_index: 0 });
    assert!(!e.is_terminal);
  }

  #[test]
  fn reset_returns_to_start() {
    let mut s = session(2, 20);
    s.submit("step1").unwrap();
    s.reset();
    assert_eq!(s.snapshot(), AttemptState::fresh().snapshot());
    assert_eq!(s.current_step().map(|st| st.id), Some(1));
  }

  #[test]
  fn linked_list_walkthrough() {
    let mut s = Session::reset_attempt(Arc::new(linked_list_intro())).unwrap();
    let answers = [
      "class Node:\n    def __init__(self, data):",
      "node.data = 42",
      "first.next = second",
      "current = head\nwhile current:\n    print(current.data)",
      "new.next = head\nhead = new",
      "current.next = None",
    ];
    let mut total = 0;
    let mut last = None;
    for code in answers {
      let v = s.submit(code).unwrap();
      assert!(v.accepted, "rejected: {code}");
      total += v.xp_delta;
      last = Some(v);
    }
    assert_eq!(total, 150);
    let last = last.unwrap();
    assert!(last.is_challenge_complete);
    assert!(last.visualization_event.unwrap().is_terminal);
    assert_eq!(s.node_count(), 3);
  }
}
