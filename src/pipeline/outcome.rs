//! Per-phase results of a cleanup run

use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// How a phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOutcome {
    Succeeded,
    /// Finished, but an optional step failed and was logged
    SucceededWithWarning,
    /// Not run because a version, connectivity or probe check said no
    SkippedByGate,
    /// Not run because configuration disabled it
    SkippedByConfig,
    Failed,
}

impl WorkflowOutcome {
    pub fn ran(self) -> bool {
        !matches!(
            self,
            WorkflowOutcome::SkippedByGate | WorkflowOutcome::SkippedByConfig
        )
    }

    pub fn succeeded(self) -> bool {
        !matches!(self, WorkflowOutcome::Failed)
    }
}

impl fmt::Display for WorkflowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WorkflowOutcome::Succeeded => "succeeded",
            WorkflowOutcome::SucceededWithWarning => "succeeded with warnings",
            WorkflowOutcome::SkippedByGate => "skipped",
            WorkflowOutcome::SkippedByConfig => "disabled",
            WorkflowOutcome::Failed => "failed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub phase: &'static str,
    pub outcome: WorkflowOutcome,
    pub error: Option<String>,
    #[serde(skip)]
    pub duration: Duration,
}

impl PhaseReport {
    pub fn new(phase: &'static str, outcome: WorkflowOutcome) -> Self {
        Self {
            phase,
            outcome,
            error: None,
            duration: Duration::ZERO,
        }
    }

    pub fn failed(phase: &'static str, error: impl Into<String>) -> Self {
        Self {
            phase,
            outcome: WorkflowOutcome::Failed,
            error: Some(error.into()),
            duration: Duration::ZERO,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn ran(&self) -> bool {
        self.outcome.ran()
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.succeeded()
    }
}

/// Why cleanup did nothing at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ToolNotFound,
    NoServersConfigured,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub skipped: Option<SkipReason>,
    pub phases: Vec<PhaseReport>,
}

impl CleanupReport {
    pub fn skipped(reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            phases: Vec::new(),
        }
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == name)
    }

    /// Only a failed teardown fails the job
    pub fn failed(&self) -> bool {
        self.phase(super::phases::teardown::PHASE_NAME)
            .map_or(false, |p| !p.succeeded())
    }

    pub fn exit_code(&self) -> i32 {
        if self.failed() {
            1
        } else {
            0
        }
    }
}
