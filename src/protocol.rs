//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ChallengeDefinition, Difficulty, StepDefinition, VisualizationKind};
use crate::engine::progression::Verdict;
use crate::engine::visualization::NodeLink;
use crate::engine::{RenderAction, Snapshot, SubmissionVerdict, VerdictReason, VisualizationEvent};
use crate::state::ProgressRecord;

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    ListChallenges,
    OpenAttempt {
        #[serde(rename = "userId")]
        user_id: String,
        #[serde(rename = "challengeId")]
        challenge_id: String,
    },
    SubmitCode {
        #[serde(rename = "attemptId")]
        attempt_id: String,
        code: String,
    },
    Snapshot {
        #[serde(rename = "attemptId")]
        attempt_id: String,
    },
    ResetAttempt {
        #[serde(rename = "attemptId")]
        attempt_id: String,
    },
    Hint {
        #[serde(rename = "attemptId")]
        attempt_id: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Challenges { challenges: Vec<ChallengeSummary> },
    Attempt { attempt: AttemptOut },
    Verdict { verdict: VerdictOut },
    Hint { text: Option<String> },
    Error { kind: String, message: String },
}

//
// Challenge catalog
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub category: String,
    pub step_count: usize,
}

pub fn to_summary(c: &ChallengeDefinition) -> ChallengeSummary {
    ChallengeSummary {
        id: c.id.clone(),
        title: c.title.clone(),
        description: c.description.clone(),
        difficulty: c.difficulty,
        xp_reward: c.xp_reward,
        category: c.category.clone(),
        step_count: c.steps.len(),
    }
}

/// Learner-facing step view; acceptance patterns stay on the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOut {
    pub index: usize,
    pub id: u32,
    pub instruction: String,
    pub visualization: VisualizationKind,
}

pub fn to_step_out(index: usize, s: &StepDefinition) -> StepOut {
    StepOut {
        index,
        id: s.id,
        instruction: s.instruction.clone(),
        visualization: s.visualization_kind,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeOut {
    #[serde(flatten)]
    pub summary: ChallengeSummary,
    pub template: String,
    pub steps: Vec<StepOut>,
}

pub fn to_out(c: &ChallengeDefinition) -> ChallengeOut {
    ChallengeOut {
        summary: to_summary(c),
        template: c.template.clone(),
        steps: c.steps.iter().enumerate().map(|(i, s)| to_step_out(i, s)).collect(),
    }
}

/// Body of `POST /api/v1/challenges`; `id` is generated when absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeIn {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub initial_nodes: usize,
    pub steps: Vec<StepIn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepIn {
    #[serde(default)]
    pub id: Option<u32>,
    pub instruction: String,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub acceptance_patterns: Vec<String>,
    pub visualization: VisualizationKind,
}

//
// Attempts
//

#[derive(Debug, Deserialize)]
pub struct OpenAttemptIn {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "challengeId")]
    pub challenge_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitIn {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptOut {
    pub attempt_id: String,
    pub challenge_id: String,
    #[serde(flatten)]
    pub snapshot: Snapshot,
    pub last_verdict: Option<Verdict>,
    pub current_step: Option<StepOut>,
    pub node_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionOut {
    NodeCreate {
        #[serde(rename = "nodeIndex")]
        node_index: usize,
    },
    NodeLink {
        link: Option<NodeLink>,
    },
    NodeTraverse {
        visits: Vec<usize>,
    },
    Complete,
    Console,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOut {
    pub step_id: u32,
    pub kind: VisualizationKind,
    pub is_terminal: bool,
    pub node_count: usize,
    #[serde(flatten)]
    pub action: ActionOut,
}

pub fn to_event_out(e: &VisualizationEvent) -> EventOut {
    let action = match &e.action {
        RenderAction::NodeCreate { node_index } => ActionOut::NodeCreate { node_index: *node_index },
        RenderAction::NodeLink { link } => ActionOut::NodeLink { link: *link },
        RenderAction::NodeTraverse { traversal } => ActionOut::NodeTraverse {
            visits: traversal.visits().map(|v| v.index).collect(),
        },
        RenderAction::Complete => ActionOut::Complete,
        RenderAction::Console => ActionOut::Console,
    };
    EventOut {
        step_id: e.step_id,
        kind: e.kind,
        is_terminal: e.is_terminal,
        node_count: e.node_count,
        action,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictOut {
    pub accepted: bool,
    pub reason: VerdictReason,
    pub xp_delta: u32,
    pub is_challenge_complete: bool,
    pub visualization_event: Option<EventOut>,
    pub attempt: AttemptOut,
}

pub fn to_verdict_out(v: &SubmissionVerdict, attempt: AttemptOut) -> VerdictOut {
    VerdictOut {
        accepted: v.accepted,
        reason: v.reason,
        xp_delta: v.xp_delta,
        is_challenge_complete: v.is_challenge_complete,
        visualization_event: v.visualization_event.as_ref().map(to_event_out),
        attempt,
    }
}

#[derive(Serialize)]
pub struct HintOut {
    pub text: Option<String>,
}

//
// Progress
//

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    #[serde(rename = "userId")]
    pub user_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOut {
    pub user_id: String,
    pub total_xp: u32,
    pub completed_challenges: Vec<String>,
    pub records: Vec<ProgressRecord>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
    pub message: String,
}
