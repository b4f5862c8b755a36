//! Textual acceptance check for a submitted source against one step.
//!
//! No parsing or execution happens here: a submission passes when its
//! lowercased text contains at least one of the step's patterns.

use crate::domain::StepDefinition;

/// True if any acceptance pattern occurs in `source`, ignoring case.
///
/// A step with no patterns fails closed. Blank patterns are ignored so they
/// can never accept everything.
pub fn check(source: &str, step: &StepDefinition) -> bool {
  let haystack = source.to_lowercase();
  step
    .acceptance_patterns
    .iter()
    .filter(|p| !p.is_empty())
    .any(|p| haystack.contains(&p.to_lowercase()))
}
