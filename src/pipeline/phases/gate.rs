//! Decides which build-info post tasks run
//!
//! Checked in order: feature flags, CLI version, server connectivity. Each
//! check only runs when something is still enabled, so a job with both
//! features off makes no CLI calls here.

use super::connection::check_connection;
use crate::config::FeatureFlags;
use crate::pipeline::context::CleanupContext;
use crate::pipeline::outcome::WorkflowOutcome;
use crate::tool::VersionGate;
use anyhow::Result;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Run,
    Skip(WorkflowOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostTaskPlan {
    pub publish: Decision,
    pub summary: Decision,
}

impl PostTaskPlan {
    fn both(decision: Decision) -> Self {
        Self {
            publish: decision,
            summary: decision,
        }
    }

    /// Enabled tasks become `Skip(outcome)`, disabled ones stay disabled
    fn gate_enabled(self, outcome: WorkflowOutcome) -> Self {
        let gate = |d: Decision| match d {
            Decision::Run => Decision::Skip(outcome),
            skipped => skipped,
        };
        Self {
            publish: gate(self.publish),
            summary: gate(self.summary),
        }
    }
}

/// Fails only on configuration errors (malformed flag or minimum version)
pub async fn plan_post_tasks(context: &CleanupContext) -> Result<PostTaskPlan> {
    let platform = context.platform.as_ref();
    let flags = FeatureFlags::read(platform)?;
    let summary_supported = context.summary.is_supported();
    debug!(?flags, summary_supported, "Build-info post task flags");

    let enabled = |disabled: bool| {
        if disabled {
            Decision::Skip(WorkflowOutcome::SkippedByConfig)
        } else {
            Decision::Run
        }
    };
    let plan = PostTaskPlan {
        publish: enabled(flags.disable_auto_build_publish),
        summary: enabled(flags.disable_job_summary || !summary_supported),
    };

    if plan == PostTaskPlan::both(Decision::Skip(WorkflowOutcome::SkippedByConfig)) {
        platform.info(
            "Both auto-build-publish and job-summary are disabled. Skipping Build Info post tasks.",
        );
        return Ok(plan);
    }

    let minimum = context.config.min_version()?;
    if !VersionGate::new(context.runner.as_ref())
        .reporting_to(platform)
        .is_satisfied(&minimum)
        .await
    {
        platform.info(&format!(
            "JFrog CLI version {} or above is required for auto build publish and job summary. Skipping Build Info post tasks.",
            minimum
        ));
        return Ok(plan.gate_enabled(WorkflowOutcome::SkippedByGate));
    }

    if !check_connection(context.runner.as_ref(), platform).await {
        return Ok(plan.gate_enabled(WorkflowOutcome::SkippedByGate));
    }

    if plan.publish != Decision::Run {
        platform.info(
            "Auto build info publish is disabled. Skipping auto build info collection and publishing",
        );
    }
    if plan.summary != Decision::Run {
        platform.info("Job summary is disabled. Skipping job summary generation");
    }
    Ok(plan)
}
