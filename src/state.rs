//! Application state: challenge catalog, live attempts, and the progress store.
//!
//! This module owns:
//!   - the challenge catalog (seeds, TOML bank, demo fillers, API-created)
//!   - the attempt registry, one mutex-guarded `Session` per attempt
//!   - the in-memory progress records per user
//!
//! The engine never touches these stores; `logic` reports outcomes here.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::config::{load_config_from_env, AppConfig};
use crate::domain::ChallengeDefinition;
use crate::engine::Session;
use crate::error::{Result, ServiceError};
use crate::fixtures::filler_challenges;
use crate::seeds::seed_challenges;

/// Status reported to the progress store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    Failed,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub challenge_id: String,
    pub status: ProgressStatus,
    pub code: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A live attempt. The mutex serializes submissions for this attempt only.
pub struct AttemptHandle {
    pub user_id: String,
    pub challenge_id: String,
    pub session: Mutex<Session>,
}

#[derive(Clone)]
pub struct AppState {
    pub by_id: Arc<RwLock<HashMap<String, Arc<ChallengeDefinition>>>>,
    pub attempts: Arc<RwLock<HashMap<String, Arc<AttemptHandle>>>>,
    pub progress: Arc<RwLock<HashMap<String, Vec<ProgressRecord>>>>,
}

impl AppState {
    /// Build state from env: load config, seed challenges, add demo fillers.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        Self::from_config(load_config_from_env())
    }

    pub fn from_config(cfg: Option<AppConfig>) -> Self {
        let mut id_map = HashMap::<String, Arc<ChallengeDefinition>>::new();

        // Bank entries first; invalid ones are skipped, never repaired.
        let mut fillers = 0;
        if let Some(cfg) = cfg {
            fillers = cfg.demo_fillers;
            for cc in cfg.challenges {
                let def = cc.into_definition();
                if let Err(e) = def.validate() {
                    error!(target: "challenge", id = %def.id, error = %e, "Skipping bank item: invalid definition.");
                    continue;
                }
                id_map.insert(def.id.clone(), Arc::new(def));
            }
        }

        // Always insert built-in seeds, but don't overwrite existing ids.
        for c in seed_challenges() {
            id_map.entry(c.id.clone()).or_insert_with(|| Arc::new(c));
        }

        if fillers > 0 {
            let start = id_map.len() + 1;
            for c in filler_challenges(&mut thread_rng(), start, fillers) {
                id_map.entry(c.id.clone()).or_insert_with(|| Arc::new(c));
            }
            warn!(target: "challenge", count = fillers, "Added listing-only demo fillers");
        }

        info!(target: "challenge", total = id_map.len(), "Startup challenge inventory");

        Self {
            by_id: Arc::new(RwLock::new(id_map)),
            attempts: Arc::new(RwLock::new(HashMap::new())),
            progress: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    // ── Catalog ──

    /// All challenges, sorted by id.
    pub async fn list_challenges(&self) -> Vec<Arc<ChallengeDefinition>> {
        let mut all: Vec<_> = self.by_id.read().await.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    /// Validates and inserts a new challenge. Ids must be unique.
    #[instrument(level = "debug", skip(self, def), fields(id = %def.id))]
    pub async fn create_challenge(&self, def: ChallengeDefinition) -> Result<Arc<ChallengeDefinition>> {
        def.validate().map_err(crate::engine::EngineError::from)?;
        let mut by_id = self.by_id.write().await;
        if by_id.contains_key(&def.id) {
            return Err(ServiceError::DuplicateChallenge(def.id));
        }
        let def = Arc::new(def);
        by_id.insert(def.id.clone(), Arc::clone(&def));
        info!(target: "challenge", id = %def.id, steps = def.steps.len(), "Challenge created");
        Ok(def)
    }

    /// Read-only access to a challenge by id.
    pub async fn get_challenge(&self, id: &str) -> Option<Arc<ChallengeDefinition>> {
        self.by_id.read().await.get(id).cloned()
    }

    // ── Attempts ──

    /// Starts a fresh attempt and registers it under a new id. Any earlier
    /// attempt by the same user on the same challenge is discarded.
    #[instrument(level = "debug", skip(self))]
    pub async fn open_attempt(&self, user_id: &str, challenge_id: &str) -> Result<(String, Arc<AttemptHandle>)> {
        let def = self
            .get_challenge(challenge_id)
            .await
            .ok_or_else(|| ServiceError::UnknownChallenge(challenge_id.to_string()))?;
        let session = Session::reset_attempt(def)?;
        let handle = Arc::new(AttemptHandle {
            user_id: user_id.to_string(),
            challenge_id: challenge_id.to_string(),
            session: Mutex::new(session),
        });
        let id = Uuid::new_v4().to_string();
        let mut attempts = self.attempts.write().await;
        let before = attempts.len();
        attempts.retain(|_, a| !(a.user_id == user_id && a.challenge_id == challenge_id));
        if attempts.len() < before {
            debug!(target: "attempt", %user_id, %challenge_id, "Replaced previous attempt");
        }
        attempts.insert(id.clone(), Arc::clone(&handle));
        Ok((id, handle))
    }

    pub async fn attempt(&self, attempt_id: &str) -> Result<Arc<AttemptHandle>> {
        self.attempts
            .read()
            .await
            .get(attempt_id)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownAttempt(attempt_id.to_string()))
    }

    /// Discards an attempt. Returns false if it didn't exist.
    pub async fn close_attempt(&self, attempt_id: &str) -> bool {
        self.attempts.write().await.remove(attempt_id).is_some()
    }

    // ── Progress store ──

    pub async fn get_progress(&self, user_id: &str) -> Vec<ProgressRecord> {
        self.progress.read().await.get(user_id).cloned().unwrap_or_default()
    }

    /// Creates or updates the record for (user, challenge). Empty `code`
    /// keeps what was stored before. A `Completed` record is never
    /// downgraded; such updates return the stored record unchanged.
    #[instrument(level = "debug", skip(self, code), fields(code_len = code.len()))]
    pub async fn upsert_progress(
        &self,
        user_id: &str,
        challenge_id: &str,
        status: ProgressStatus,
        code: &str,
    ) -> ProgressRecord {
        let now = Utc::now();
        let mut progress = self.progress.write().await;
        let records = progress.entry(user_id.to_string()).or_default();
        let completed_at = (status == ProgressStatus::Completed).then_some(now);

        if let Some(rec) = records.iter_mut().find(|r| r.challenge_id == challenge_id) {
            if rec.status == ProgressStatus::Completed && status != ProgressStatus::Completed {
                debug!(target: "attempt", %user_id, %challenge_id, ?status, "Keeping Completed status");
                return rec.clone();
            }
            rec.status = status;
            if !code.is_empty() {
                rec.code = code.to_string();
            }
            if completed_at.is_some() {
                rec.completed_at = completed_at;
            }
            rec.updated_at = now;
            return rec.clone();
        }

        let rec = ProgressRecord {
            challenge_id: challenge_id.to_string(),
            status,
            code: code.to_string(),
            completed_at,
            updated_at: now,
        };
        records.push(rec.clone());
        rec
    }

    /// Total XP over completed challenges, plus their ids.
    pub async fn user_summary(&self, user_id: &str) -> (u32, Vec<String>) {
        let records = self.get_progress(user_id).await;
        let by_id = self.by_id.read().await;
        let mut total = 0;
        let mut completed = vec![];
        for r in records.iter().filter(|r| r.status == ProgressStatus::Completed) {
            if let Some(c) = by_id.get(&r.challenge_id) {
                total += c.xp_reward;
            }
            completed.push(r.challenge_id.clone());
        }
        (total, completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::challenge;
    use crate::engine::error::ConfigError;
    use crate::engine::EngineError;

    fn state() -> AppState {
        AppState::from_config(None)
    }

    #[tokio::test]
    async fn seeds_are_listed_sorted() {
        let ids: Vec<String> = state().list_challenges().await.iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["js-functions-1", "linked-list-intro", "python-basics-1"]);
    }

    #[tokio::test]
    async fn invalid_bank_items_are_skipped() {
        let cfg: AppConfig = toml::from_str(
            r#"
[[challenges]]
id = "broken"
title = "Broken"
xp_reward = 10
"#,
        )
        .unwrap();
        let s = AppState::from_config(Some(cfg));
        assert!(s.get_challenge("broken").await.is_none());
    }

    #[tokio::test]
    async fn fillers_list_but_do_not_open() {
        let s = AppState::from_config(Some(AppConfig { demo_fillers: 3, challenges: vec![] }));
        let all = s.list_challenges().await;
        assert_eq!(all.len(), 6);
        let filler = all.iter().find(|c| c.steps.is_empty()).unwrap();
        let err = s.open_attempt("u1", &filler.id).await.err().unwrap();
        assert!(matches!(
            err,
            ServiceError::Engine(EngineError::Config(ConfigError::NoSteps { .. }))
        ));
    }

    #[tokio::test]
    async fn create_rejects_duplicates_and_bad_definitions() {
        let s = state();
        let c = challenge(2, 40);
        s.create_challenge(c.clone()).await.unwrap();
        assert!(matches!(
            s.create_challenge(c).await,
            Err(ServiceError::DuplicateChallenge(_))
        ));

        let mut bad = challenge(2, 41);
        bad.steps[0].acceptance_patterns.clear();
        assert!(matches!(s.create_challenge(bad).await, Err(ServiceError::Engine(_))));
    }

    #[tokio::test]
    async fn unknown_ids_are_reported() {
        let s = state();
        assert!(matches!(
            s.open_attempt("u1", "missing").await.err(),
            Some(ServiceError::UnknownChallenge(_))
        ));
        assert!(matches!(s.attempt("missing").await, Err(ServiceError::UnknownAttempt(_))));
    }

    #[tokio::test]
    async fn upsert_keeps_code_and_stamps_completion() {
        let s = state();
        let r = s.upsert_progress("u1", "c1", ProgressStatus::InProgress, "print(1)").await;
        assert!(r.completed_at.is_none());
        let r = s.upsert_progress("u1", "c1", ProgressStatus::Completed, "").await;
        assert_eq!(r.code, "print(1)");
        assert!(r.completed_at.is_some());
        assert_eq!(s.get_progress("u1").await.len(), 1);
        assert!(s.get_progress("u2").await.is_empty());
    }

    #[tokio::test]
    async fn completed_record_is_never_downgraded() {
        let s = state();
        s.upsert_progress("u1", "c1", ProgressStatus::Completed, "done()").await;
        for status in [ProgressStatus::InProgress, ProgressStatus::Failed] {
            let r = s.upsert_progress("u1", "c1", status, "broken").await;
            assert_eq!(r.status, ProgressStatus::Completed);
            assert_eq!(r.code, "done()");
        }
        assert_eq!(s.get_progress("u1").await[0].status, ProgressStatus::Completed);
    }

    #[tokio::test]
    async fn reopening_replaces_the_live_attempt() {
        let s = state();
        let (first, _) = s.open_attempt("u1", "js-functions-1").await.unwrap();
        let (other, _) = s.open_attempt("u1", "python-basics-1").await.unwrap();
        let (second, _) = s.open_attempt("u1", "js-functions-1").await.unwrap();
        let (peer, _) = s.open_attempt("u2", "js-functions-1").await.unwrap();

        assert_eq!(s.attempts.read().await.len(), 3);
        assert!(matches!(s.attempt(&first).await, Err(ServiceError::UnknownAttempt(_))));
        for id in [&other, &second, &peer] {
            assert!(s.attempt(id).await.is_ok());
        }
    }

    #[tokio::test]
    async fn summary_counts_completed_rewards() {
        let s = state();
        s.upsert_progress("u1", "python-basics-1", ProgressStatus::Completed, "x").await;
        s.upsert_progress("u1", "js-functions-1", ProgressStatus::InProgress, "x").await;
        let (xp, done) = s.user_summary("u1").await;
        assert_eq!(xp, 100);
        assert_eq!(done, vec!["python-basics-1".to_string()]);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(serde_json::to_string(&ProgressStatus::InProgress).unwrap(), "\"In Progress\"");
        assert_eq!(serde_json::to_string(&ProgressStatus::Completed).unwrap(), "\"Completed\"");
    }
}
