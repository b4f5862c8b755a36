//! Errors raised by the progression engine.
//!
//! A rejected submission is never an error. These variants cover the
//! exceptional outcomes a UI must render differently from "tests failed".

/// A challenge definition the engine refuses to run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("challenge has no id")]
    MissingId,

    #[error("challenge {challenge_id} has no steps")]
    NoSteps { challenge_id: String },

    #[error("challenge {challenge_id} awards no XP")]
    ZeroXpReward { challenge_id: String },

    #[error("step {step_id} has no acceptance patterns")]
    EmptyPatterns { step_id: u32 },

    #[error("step {step_id} has an empty acceptance pattern")]
    BlankPattern { step_id: u32 },

    #[error("step at position {position} has id {found}, expected {expected}")]
    StepOrdinal { position: usize, expected: u32, found: u32 },
}

/// Errors that can occur while running an attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid attempt state: step index {index} with {steps} steps (complete: {complete})")]
    InvalidState { index: usize, steps: usize, complete: bool },
}

pub type Result<T> = core::result::Result<T, EngineError>;
