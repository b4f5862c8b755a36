//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Opening, resetting, and closing attempts
//!   - Submitting code and reporting the outcome to the progress store
//!   - Hints and snapshots for progress indicators
//!   - Catalog listing and creation

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::{ChallengeDefinition, StepDefinition};
use crate::engine::{Session, SubmissionVerdict, VerdictReason};
use crate::error::{Result, ServiceError};
use crate::protocol::{
  to_out, to_step_out, to_summary, to_verdict_out, AttemptOut, ChallengeIn, ChallengeOut, ChallengeSummary,
  ProgressOut, VerdictOut,
};
use crate::state::{AppState, ProgressStatus};
use crate::util::trunc_for_log;

fn attempt_out(attempt_id: &str, session: &Session) -> AttemptOut {
  let snapshot = session.snapshot();
  AttemptOut {
    attempt_id: attempt_id.to_string(),
    challenge_id: session.challenge().id.clone(),
    snapshot,
    last_verdict: session.state().last_verdict,
    current_step: session
      .current_step()
      .map(|s| to_step_out(snapshot.current_step_index, s)),
    node_count: session.node_count(),
  }
}

pub async fn list_challenges(state: &AppState) -> Vec<ChallengeSummary> {
  state.list_challenges().await.iter().map(|c| to_summary(c)).collect()
}

pub async fn get_challenge(state: &AppState, id: &str) -> Result<ChallengeOut> {
  state
    .get_challenge(id)
    .await
    .map(|c| to_out(&c))
    .ok_or_else(|| ServiceError::UnknownChallenge(id.to_string()))
}

#[instrument(level = "info", skip(state, body), fields(title = %body.title, steps = body.steps.len()))]
pub async fn create_challenge(state: &AppState, body: ChallengeIn) -> Result<ChallengeOut> {
  let def = ChallengeDefinition {
    id: body.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
    title: body.title,
    description: body.description,
    difficulty: body.difficulty,
    xp_reward: body.xp_reward,
    category: body.category,
    template: body.template,
    initial_nodes: body.initial_nodes,
    steps: body
      .steps
      .into_iter()
      .enumerate()
      .map(|(pos, s)| StepDefinition {
        id: s.id.unwrap_or(pos as u32 + 1),
        instruction: s.instruction,
        hint: s.hint,
        acceptance_patterns: s.acceptance_patterns,
        visualization_kind: s.visualization,
      })
      .collect(),
  };
  let created = state.create_challenge(def).await?;
  Ok(to_out(&created))
}

#[instrument(level = "info", skip(state), fields(%user_id, %challenge_id))]
pub async fn open_attempt(state: &AppState, user_id: &str, challenge_id: &str) -> Result<AttemptOut> {
  if user_id.trim().is_empty() {
    return Err(ServiceError::BadRequest("userId must not be empty".into()));
  }
  let (attempt_id, handle) = state.open_attempt(user_id, challenge_id).await?;
  state
    .upsert_progress(user_id, challenge_id, ProgressStatus::InProgress, "")
    .await;
  let session = handle.session.lock().await;
  info!(target: "attempt", %attempt_id, %user_id, %challenge_id, "Attempt opened");
  Ok(attempt_out(&attempt_id, &session))
}

/// Runs one submission. A second submission on the same attempt while one is
/// running is refused rather than queued. The outcome is reported before the
/// attempt is released, so reports for one attempt land in submission order.
#[instrument(level = "info", skip(state, code), fields(%attempt_id, code_len = code.len()))]
pub async fn submit_code(state: &AppState, attempt_id: &str, code: &str) -> Result<VerdictOut> {
  let handle = state.attempt(attempt_id).await?;
  let mut session = handle
    .session
    .try_lock()
    .map_err(|_| ServiceError::SubmissionInFlight)?;
  let verdict = session.submit(code)?;
  report_outcome(state, &handle.user_id, &handle.challenge_id, &verdict, code).await;
  let out = attempt_out(attempt_id, &session);
  drop(session);

  info!(
    target: "attempt",
    %attempt_id,
    accepted = verdict.accepted,
    reason = ?verdict.reason,
    xp_delta = verdict.xp_delta,
    complete = verdict.is_challenge_complete,
    "Submission evaluated"
  );
  Ok(to_verdict_out(&verdict, out))
}

/// Persists the terminal state of a submission. The store keeps a finished
/// challenge `Completed` whatever is reported after it.
async fn report_outcome(state: &AppState, user_id: &str, challenge_id: &str, v: &SubmissionVerdict, code: &str) {
  let status = match v.reason {
    VerdictReason::ChallengeAlreadyComplete => return,
    VerdictReason::Passed if v.is_challenge_complete => ProgressStatus::Completed,
    VerdictReason::Passed => ProgressStatus::InProgress,
    VerdictReason::TestsFailed => ProgressStatus::Failed,
  };
  debug!(target: "attempt", %user_id, %challenge_id, ?status, code = %trunc_for_log(code, 80), "Reporting progress");
  state.upsert_progress(user_id, challenge_id, status, code).await;
}

pub async fn snapshot(state: &AppState, attempt_id: &str) -> Result<AttemptOut> {
  let handle = state.attempt(attempt_id).await?;
  let session = handle.session.lock().await;
  Ok(attempt_out(attempt_id, &session))
}

#[instrument(level = "info", skip(state), fields(%attempt_id))]
pub async fn reset_attempt(state: &AppState, attempt_id: &str) -> Result<AttemptOut> {
  let handle = state.attempt(attempt_id).await?;
  let mut session = handle
    .session
    .try_lock()
    .map_err(|_| ServiceError::SubmissionInFlight)?;
  session.reset();
  info!(target: "attempt", %attempt_id, "Attempt reset");
  Ok(attempt_out(attempt_id, &session))
}

pub async fn close_attempt(state: &AppState, attempt_id: &str) -> Result<()> {
  if state.close_attempt(attempt_id).await {
    Ok(())
  } else {
    Err(ServiceError::UnknownAttempt(attempt_id.to_string()))
  }
}

/// Hint for the current step; `None` once the challenge is complete.
pub async fn hint(state: &AppState, attempt_id: &str) -> Result<Option<String>> {
  let handle = state.attempt(attempt_id).await?;
  let session = handle.session.lock().await;
  let text = session.current_step().map(|s| s.hint.clone());
  if text.is_none() {
    warn!(target: "attempt", %attempt_id, "Hint requested for a finished attempt");
  }
  Ok(text)
}

pub async fn progress(state: &AppState, user_id: &str) -> ProgressOut {
  let (total_xp, completed_challenges) = state.user_summary(user_id).await;
  ProgressOut {
    user_id: user_id.to_string(),
    total_xp,
    completed_challenges,
    records: state.get_progress(user_id).await,
  }
}
