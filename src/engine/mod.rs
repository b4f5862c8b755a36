//! Challenge progression and validation engine.
//!
//! Synchronous and framework-free: nothing here performs I/O or suspends.
//! The service layer owns persistence and transport.

pub mod checker;
pub mod error;
pub mod progression;
pub mod session;
pub mod visualization;

pub use error::EngineError;
pub use progression::Snapshot;
pub use session::{Session, SubmissionVerdict, VerdictReason};
pub use visualization::{RenderAction, VisualizationEvent};
