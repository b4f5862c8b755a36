//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs ids and basic result info.

use std::sync::Arc;
use axum::{
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use tracing::{info, instrument, warn};

use crate::engine::EngineError;
use crate::error::ServiceError;
use crate::logic;
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for ServiceError {
  fn into_response(self) -> Response {
    let status = match &self {
      ServiceError::UnknownChallenge(_) | ServiceError::UnknownAttempt(_) => StatusCode::NOT_FOUND,
      ServiceError::DuplicateChallenge(_) | ServiceError::SubmissionInFlight => StatusCode::CONFLICT,
      ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ServiceError::Engine(EngineError::Config(_)) => StatusCode::UNPROCESSABLE_ENTITY,
      ServiceError::Engine(EngineError::InvalidState { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    warn!(target: "codequest_backend", status = status.as_u16(), kind = self.kind(), error = %self, "Request failed");
    let body = ErrorOut { error: self.kind().to_string(), message: self.to_string() };
    (status, Json(body)).into_response()
  }
}

type ApiResult<T> = Result<Json<T>, ServiceError>;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_list_challenges(State(state): State<Arc<AppState>>) -> Json<Vec<ChallengeSummary>> {
  let list = logic::list_challenges(&state).await;
  info!(target: "challenge", count = list.len(), "HTTP challenge list served");
  Json(list)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_challenge(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<ChallengeOut> {
  Ok(Json(logic::get_challenge(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_create_challenge(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChallengeIn>,
) -> Result<(StatusCode, Json<ChallengeOut>), ServiceError> {
  let out = logic::create_challenge(&state, body).await?;
  Ok((StatusCode::CREATED, Json(out)))
}

#[instrument(level = "info", skip(state, body), fields(user_id = %body.user_id, challenge_id = %body.challenge_id))]
pub async fn http_open_attempt(
  State(state): State<Arc<AppState>>,
  Json(body): Json<OpenAttemptIn>,
) -> Result<(StatusCode, Json<AttemptOut>), ServiceError> {
  let out = logic::open_attempt(&state, &body.user_id, &body.challenge_id).await?;
  Ok((StatusCode::CREATED, Json(out)))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_attempt(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<AttemptOut> {
  Ok(Json(logic::snapshot(&state, &id).await?))
}

#[instrument(level = "info", skip(state, body), fields(code_len = body.code.len()))]
pub async fn http_submit(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<SubmitIn>,
) -> ApiResult<VerdictOut> {
  Ok(Json(logic::submit_code(&state, &id, &body.code).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_reset_attempt(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<AttemptOut> {
  Ok(Json(logic::reset_attempt(&state, &id).await?))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_hint(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> ApiResult<HintOut> {
  let text = logic::hint(&state, &id).await?;
  Ok(Json(HintOut { text }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_close_attempt(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
  logic::close_attempt(&state, &id).await?;
  Ok(StatusCode::NO_CONTENT)
}

#[instrument(level = "info", skip(state), fields(user_id = %q.user_id))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProgressQuery>,
) -> Json<ProgressOut> {
  Json(logic::progress(&state, &q.user_id).await)
}
