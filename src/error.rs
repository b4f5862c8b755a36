//! Errors surfaced by the service layer around the engine.

use crate::engine::EngineError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
  #[error("unknown challenge: {0}")]
  UnknownChallenge(String),

  #[error("unknown attempt: {0}")]
  UnknownAttempt(String),

  #[error("challenge already exists: {0}")]
  DuplicateChallenge(String),

  #[error("a submission for this attempt is already in flight")]
  SubmissionInFlight,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Engine(#[from] EngineError),
}

impl ServiceError {
  /// Stable machine-readable kind, shared by HTTP and WebSocket replies.
  pub fn kind(&self) -> &'static str {
    match self {
      ServiceError::UnknownChallenge(_) => "unknown_challenge",
      ServiceError::UnknownAttempt(_) => "unknown_attempt",
      ServiceError::DuplicateChallenge(_) => "duplicate_challenge",
      ServiceError::SubmissionInFlight => "submission_in_flight",
      ServiceError::BadRequest(_) => "bad_request",
      ServiceError::Engine(EngineError::Config(_)) => "configuration_error",
      ServiceError::Engine(EngineError::InvalidState { .. }) => "invalid_state",
    }
  }
}

pub type Result<T> = core::result::Result<T, ServiceError>;
