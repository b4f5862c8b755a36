//! Domain models: challenge definitions, their ordered steps, and the
//! visualization hints a renderer uses to depict accepted steps.

use serde::{Deserialize, Serialize};

use crate::engine::error::ConfigError;

/// How hard a challenge is advertised to be.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}
impl Default for Difficulty {
  fn default() -> Self { Difficulty::Beginner }
}

/// What a renderer should depict once a step is accepted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationKind {
  NodeCreate,
  NodeLink,
  NodeTraverse,
  Complete,
  Console,
}

/// A single checkable unit of instruction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepDefinition {
  /// 1-based ordinal within the challenge.
  pub id: u32,
  pub instruction: String,
  #[serde(default)] pub hint: String,
  /// Case-insensitive substrings; any one of them accepts the step.
  pub acceptance_patterns: Vec<String>,
  #[serde(rename = "visualization")]
  pub visualization_kind: VisualizationKind,
}

/// Immutable description of a challenge.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeDefinition {
  pub id: String,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub difficulty: Difficulty,
  pub xp_reward: u32,
  #[serde(default)] pub category: String,
  /// Starter code shown in the editor.
  #[serde(default)] pub template: String,
  /// Nodes already on screen before the first step.
  #[serde(default)] pub initial_nodes: usize,
  #[serde(default)] pub steps: Vec<StepDefinition>,
}

impl ChallengeDefinition {
  /// Checks every rule an attempt relies on. Never repairs the definition.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.id.trim().is_empty() {
      return Err(ConfigError::MissingId);
    }
    if self.steps.is_empty() {
      return Err(ConfigError::NoSteps { challenge_id: self.id.clone() });
    }
    if self.xp_reward == 0 {
      return Err(ConfigError::ZeroXpReward { challenge_id: self.id.clone() });
    }
    for (position, step) in self.steps.iter().enumerate() {
      let expected = position as u32 + 1;
      if step.id != expected {
        return Err(ConfigError::StepOrdinal { position, expected, found: step.id });
      }
      if step.acceptance_patterns.is_empty() {
        return Err(ConfigError::EmptyPatterns { step_id: step.id });
      }
      if step.acceptance_patterns.iter().any(|p| p.is_empty()) {
        return Err(ConfigError::BlankPattern { step_id: step.id });
      }
    }
    Ok(())
  }

  /// XP credited for every non-final step.
  pub fn per_step_xp(&self) -> u32 {
    match self.steps.len() {
      0 => 0,
      n => self.xp_reward / n as u32,
    }
  }

  /// XP credited by the final step: the per-step share plus the remainder.
  pub fn final_step_xp(&self) -> u32 {
    match self.steps.len() {
      0 => 0,
      n => self.per_step_xp() + self.xp_reward % n as u32,
    }
  }
}

#[cfg(test)]
pub(crate) mod test_support {
  use super::*;

  pub fn step(id: u32, patterns: &[&str], kind: VisualizationKind) -> StepDefinition {
    StepDefinition {
      id,
      instruction: format!("step {id}"),
      hint: format!("hint {id}"),
      acceptance_patterns: patterns.iter().map(|p| p.to_string()).collect(),
      visualization_kind: kind,
    }
  }

  /// Challenge whose step N accepts the pattern `stepN`.
  pub fn challenge(steps: usize, xp_reward: u32) -> ChallengeDefinition {
    ChallengeDefinition {
      id: format!("test-{steps}-{xp_reward}"),
      title: "Test".into(),
      description: String::new(),
      difficulty: Difficulty::Beginner,
      xp_reward,
      category: "Data Structures".into(),
      template: String::new(),
      initial_nodes: 0,
      steps: (1..=steps as u32)
        .map(|i| step(i, &[&format!("step{i}")], VisualizationKind::Console))
        .collect(),
    }
  }
}
