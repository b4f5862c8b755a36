//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.
//!
//! Messages on one socket are handled in order, so a client can't overlap
//! submissions on the same attempt through one connection.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::error::ServiceError;
use crate::logic;
use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "codequest_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "codequest_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        // Parse, dispatch, serialize response.
        let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
          Ok(incoming) => {
            debug!(target: "codequest_backend", "WS received: {:?}", &incoming);
            handle_client_ws(incoming, &state).await
          }
          Err(e) => ServerWsMessage::Error { kind: "bad_request".into(), message: format!("Invalid JSON: {}", e) },
        };

        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "kind": "serialization", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "codequest_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "codequest_backend", "WebSocket disconnected");
}

fn ws_error(e: ServiceError) -> ServerWsMessage {
  ServerWsMessage::Error { kind: e.kind().into(), message: e.to_string() }
}

pub(crate) async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::ListChallenges => ServerWsMessage::Challenges {
      challenges: logic::list_challenges(state).await,
    },

    ClientWsMessage::OpenAttempt { user_id, challenge_id } => {
      match logic::open_attempt(state, &user_id, &challenge_id).await {
        Ok(attempt) => ServerWsMessage::Attempt { attempt },
        Err(e) => ws_error(e),
      }
    }

    ClientWsMessage::SubmitCode { attempt_id, code } => {
      match logic::submit_code(state, &attempt_id, &code).await {
        Ok(verdict) => ServerWsMessage::Verdict { verdict },
        Err(e) => ws_error(e),
      }
    }

    ClientWsMessage::Snapshot { attempt_id } => match logic::snapshot(state, &attempt_id).await {
      Ok(attempt) => ServerWsMessage::Attempt { attempt },
      Err(e) => ws_error(e),
    },

    ClientWsMessage::ResetAttempt { attempt_id } => match logic::reset_attempt(state, &attempt_id).await {
      Ok(attempt) => ServerWsMessage::Attempt { attempt },
      Err(e) => ws_error(e),
    },

    ClientWsMessage::Hint { attempt_id } => match logic::hint(state, &attempt_id).await {
      Ok(text) => ServerWsMessage::Hint { text },
      Err(e) => ws_error(e),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::Value;

  async fn roundtrip(state: &AppState, msg: Value) -> Value {
    let incoming: ClientWsMessage = serde_json::from_value(msg).unwrap();
    serde_json::to_value(handle_client_ws(incoming, state).await).unwrap()
  }

  #[tokio::test]
  async fn open_submit_and_snapshot_over_ws() {
    let state = AppState::from_config(None);
    let opened = roundtrip(
      &state,
      serde_json::json!({ "type": "open_attempt", "userId": "ws-user", "challengeId": "js-functions-1" }),
    )
    .await;
    assert_eq!(opened["type"], "attempt");
    let attempt_id = opened["attempt"]["attemptId"].as_str().unwrap().to_string();

    let verdict = roundtrip(
      &state,
      serde_json::json!({ "type": "submit_code", "attemptId": attempt_id, "code": "function sayHello() {}" }),
    )
    .await;
    assert_eq!(verdict["type"], "verdict");
    assert_eq!(verdict["verdict"]["accepted"], true);
    assert_eq!(verdict["verdict"]["xpDelta"], 62);
    assert_eq!(verdict["verdict"]["visualizationEvent"]["action"], "console");

    let snap = roundtrip(&state, serde_json::json!({ "type": "snapshot", "attemptId": attempt_id })).await;
    assert_eq!(snap["attempt"]["currentStepIndex"], 1);
    assert_eq!(snap["attempt"]["earnedXp"], 62);
  }

  #[tokio::test]
  async fn errors_carry_kind() {
    let state = AppState::from_config(None);
    let reply = roundtrip(&state, serde_json::json!({ "type": "hint", "attemptId": "nope" })).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["kind"], "unknown_attempt");
  }
}
