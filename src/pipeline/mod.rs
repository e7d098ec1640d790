//! Cleanup workflow
//!
//! A fixed sequence of fault-isolated phases. Publish and summary run first,
//! each behind its own error boundary; credential teardown always runs last
//! once the precondition check has passed.

pub mod context;
pub mod orchestrator;
pub mod outcome;
pub mod phase_trait;
pub mod phases;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

pub use context::CleanupContext;
pub use orchestrator::CleanupOrchestrator;
pub use outcome::{CleanupReport, PhaseReport, SkipReason, WorkflowOutcome};
pub use phase_trait::CleanupPhase;

#[derive(Debug, Error)]
pub enum CleanupError {
    /// The publisher cannot run without a working directory
    #[error("GITHUB_WORKSPACE is not defined.")]
    MissingWorkspace,

    #[error("Failed to remove server '{server_id}': {message}")]
    ServerRemoval { server_id: String, message: String },

    #[error("Phase panicked: {0}")]
    Panicked(String),
}
