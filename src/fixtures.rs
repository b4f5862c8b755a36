//! Demo filler generator.
//!
//! Produces listing-only challenges to pad the catalog for demos. They have
//! no steps, so opening one fails with a configuration error. Randomness
//! lives here and never inside the engine.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{ChallengeDefinition, Difficulty};

const CATEGORIES: &[&str] = &["Data Structures", "Algorithms", "Frontend", "Database", "Backend", "DevOps"];
const DIFFICULTIES: &[Difficulty] = &[Difficulty::Beginner, Difficulty::Intermediate, Difficulty::Advanced];

fn xp_for(difficulty: Difficulty) -> u32 {
  match difficulty {
    Difficulty::Beginner => 100,
    Difficulty::Intermediate => 250,
    Difficulty::Advanced => 500,
  }
}

/// `count` filler challenges numbered from `start` (`challenge-<n>`).
pub fn filler_challenges<R: Rng + ?Sized>(rng: &mut R, start: usize, count: usize) -> Vec<ChallengeDefinition> {
  (start..start + count)
    .map(|i| {
      let category = CATEGORIES.choose(&mut *rng).copied().unwrap_or(CATEGORIES[0]);
      let difficulty = DIFFICULTIES.choose(&mut *rng).copied().unwrap_or_default();
      let level = match difficulty {
        Difficulty::Beginner => "beginner",
        Difficulty::Intermediate => "intermediate",
        Difficulty::Advanced => "advanced",
      };
      ChallengeDefinition {
        id: format!("challenge-{i}"),
        title: format!("{category} Challenge {i}"),
        description: format!("Master the concepts of {category} in this {level} level challenge."),
        difficulty,
        xp_reward: xp_for(difficulty),
        category: category.to_string(),
        template: String::new(),
        initial_nodes: 0,
        steps: vec![],
      }
    })
    .collect()
}
