//! Loading service configuration (challenge bank + demo settings) from TOML.
//!
//! See `AppConfig` and `ChallengeCfg` for the expected schema:
//!
//! ```toml
//! demo_fillers = 20
//!
//! [[challenges]]
//! id = "python-loops"
//! title = "Python: Loops"
//! difficulty = "beginner"
//! xp_reward = 120
//!
//! [[challenges.steps]]
//! instruction = "Loop over range(3)"
//! acceptance_patterns = ["for i in range(3)"]
//! visualization = "console"
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{ChallengeDefinition, Difficulty, StepDefinition, VisualizationKind};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  /// Number of listing-only filler challenges to add at startup.
  #[serde(default)]
  pub demo_fillers: usize,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

/// Challenge entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub difficulty: Difficulty,
  pub xp_reward: u32,
  #[serde(default)] pub category: String,
  #[serde(default)] pub template: String,
  #[serde(default)] pub initial_nodes: usize,
  #[serde(default)] pub steps: Vec<StepCfg>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StepCfg {
  /// Defaults to the step's 1-based position.
  #[serde(default)] pub id: Option<u32>,
  pub instruction: String,
  #[serde(default)] pub hint: String,
  #[serde(default)] pub acceptance_patterns: Vec<String>,
  pub visualization: VisualizationKind,
}

impl ChallengeCfg {
  pub fn into_definition(self) -> ChallengeDefinition {
    let steps = self
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
      .collect();
    ChallengeDefinition {
      id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
      title: self.title,
      description: self.description,
      difficulty: self.difficulty,
      xp_reward: self.xp_reward,
      category: self.category,
      template: self.template,
      initial_nodes: self.initial_nodes,
      steps,
    }
  }
}

/// Load `AppConfig` from CHALLENGE_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("CHALLENGE_CONFIG_PATH").ok()?;
  load_config_from_path(Path::new(&path))
}

pub fn load_config_from_path(path: &Path) -> Option<AppConfig> {
  let shown = path.display();
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "codequest_backend", path = %shown, challenges = cfg.challenges.len(), "Loaded challenge config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "codequest_backend", path = %shown, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "codequest_backend", path = %shown, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_config(body: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(body.as_bytes()).unwrap();
    f
  }

  #[test]
  fn loads_bank_with_default_step_ids() {
    let f = write_config(
      r#"
demo_fillers = 4

[[challenges]]
id = "loops"
title = "Loops"
difficulty = "intermediate"
xp_reward = 90

[[challenges.steps]]
instruction = "Write a for loop"
acceptance_patterns = ["for "]
visualization = "console"

[[challenges.steps]]
instruction = "Walk the list"
acceptance_patterns = ["while"]
visualization = "node-traverse"
"#,
    );
    let cfg = load_config_from_path(f.path()).unwrap();
    assert_eq!(cfg.demo_fillers, 4);
    let def = cfg.challenges.into_iter().next().unwrap().into_definition();
    assert_eq!(def.id, "loops");
    assert_eq!(def.difficulty, Difficulty::Intermediate);
    assert_eq!(def.steps.iter().map(|s| s.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(def.steps[1].visualization_kind, VisualizationKind::NodeTraverse);
    assert!(def.validate().is_ok());
  }

  #[test]
  fn missing_patterns_load_but_do_not_validate() {
    let f = write_config(
      r#"
[[challenges]]
title = "Broken"
xp_reward = 10

[[challenges.steps]]
instruction = "anything"
visualization = "console"
"#,
    );
    let cfg = load_config_from_path(f.path()).unwrap();
    let def = cfg.challenges.into_iter().next().unwrap().into_definition();
    assert!(!def.id.is_empty());
    assert!(def.validate().is_err());
  }

  #[test]
  fn malformed_toml_is_none() {
    let f = write_config("challenges = [[[");
    assert!(load_config_from_path(f.path()).is_none());
  }

  #[test]
  fn missing_file_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_config_from_path(&dir.path().join("nope.toml")).is_none());
  }
}
