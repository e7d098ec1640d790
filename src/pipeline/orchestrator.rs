use super::context::CleanupContext;
use super::outcome::{CleanupReport, PhaseReport, SkipReason, WorkflowOutcome};
use super::phase_trait::CleanupPhase;
use super::phases::{
    plan_post_tasks, publish, summary, BuildInfoPublishPhase, CredentialTeardownPhase, Decision,
    JobSummaryPhase, PostTaskPlan,
};
use super::CleanupError;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs the post-job cleanup sequence
///
/// Publish and summary each sit behind their own error boundary, so neither
/// an error nor a panic in them can keep teardown from running.
#[derive(Debug, Default)]
pub struct CleanupOrchestrator;

impl CleanupOrchestrator {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, context: &CleanupContext) -> CleanupReport {
        let start = Instant::now();

        if let Some(reason) = self.precondition(context) {
            info!(?reason, "Cleanup skipped");
            return CleanupReport::skipped(reason);
        }

        let mut phases = self.post_tasks(context).await;

        let teardown = self.run_phase(&CredentialTeardownPhase, context).await;
        if let Some(error) = &teardown.error {
            context.platform.set_failed(error);
        }
        phases.push(teardown);

        let report = CleanupReport {
            skipped: None,
            phases,
        };
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            failed = report.failed(),
            "Cleanup complete"
        );
        report
    }

    fn precondition(&self, context: &CleanupContext) -> Option<SkipReason> {
        if context.locator.locate().is_none() {
            context
                .platform
                .warning("Could not find JFrog CLI executable. Skipping cleanup.");
            return Some(SkipReason::ToolNotFound);
        }
        if context.config.server_ids.is_empty() {
            context
                .platform
                .debug("No JFrog CLI servers were configured. Skipping cleanup.");
            return Some(SkipReason::NoServersConfigured);
        }
        None
    }

    async fn post_tasks(&self, context: &CleanupContext) -> Vec<PhaseReport> {
        let plan = match AssertUnwindSafe(plan_post_tasks(context))
            .catch_unwind()
            .await
        {
            Ok(Ok(plan)) => plan,
            Ok(Err(e)) => return self.gate_failed(context, format!("{:#}", e)),
            Err(panic) => {
                let error = CleanupError::Panicked(panic_message(panic.as_ref()));
                return self.gate_failed(context, error.to_string());
            }
        };
        debug!(?plan, "Post task plan");

        let PostTaskPlan { publish, summary } = plan;
        vec![
            self.run_if(publish, &BuildInfoPublishPhase, context).await,
            self.run_if(summary, &JobSummaryPhase, context).await,
        ]
    }

    fn gate_failed(&self, context: &CleanupContext, error: String) -> Vec<PhaseReport> {
        context.platform.warning(&format!(
            "Skipping Build Info post tasks: {}",
            error
        ));
        vec![
            PhaseReport::failed(publish::PHASE_NAME, error.clone()),
            PhaseReport::failed(summary::PHASE_NAME, error),
        ]
    }

    async fn run_if(
        &self,
        decision: Decision,
        phase: &dyn CleanupPhase,
        context: &CleanupContext,
    ) -> PhaseReport {
        match decision {
            Decision::Run => {
                let report = self.run_phase(phase, context).await;
                if let Some(error) = &report.error {
                    context.platform.warning(error);
                }
                report
            }
            Decision::Skip(outcome) => PhaseReport::new(phase.name(), outcome),
        }
    }

    async fn run_phase(&self, phase: &dyn CleanupPhase, context: &CleanupContext) -> PhaseReport {
        let name = phase.name();
        info!("Phase: {}", name);
        let phase_start = Instant::now();

        let report = match AssertUnwindSafe(phase.execute(context)).catch_unwind().await {
            Ok(Ok(outcome)) => PhaseReport::new(name, outcome),
            Ok(Err(e)) => PhaseReport::failed(name, format!("{:#}", e)),
            Err(panic) => PhaseReport::failed(
                name,
                CleanupError::Panicked(panic_message(panic.as_ref())).to_string(),
            ),
        };
        let report = report.with_duration(phase_start.elapsed());

        if report.outcome == WorkflowOutcome::Failed {
            warn!(phase = name, error = ?report.error, "Phase failed");
        } else {
            debug!(phase = name, outcome = %report.outcome, "Phase complete");
        }
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{LogEntry, RecordingPlatform};
    use crate::config::{AUTO_BUILD_PUBLISH_DISABLE, JFROG_CLI_SERVER_IDS_ENV_VAR, JOB_SUMMARY_DISABLE};
    use crate::pipeline::phases::connection::PING_ARGS;
    use crate::pipeline::phases::detector::DRY_RUN_ARGS;
    use crate::pipeline::phases::publish::PUBLISH_ARGS;
    use crate::pipeline::phases::summary::GENERATE_SUMMARY_ARGS;
    use crate::pipeline::phases::teardown;
    use crate::pipeline::test_support::{
        config_with_servers, context, installed_tool, working_summary, FakeLocator,
    };
    use crate::tool::{MockCommandRunner, MockReply};
    use serial_test::serial;
    use std::sync::Arc;

    const PENDING_MODULES: &str = r#"{"modules":[{"id":"app:1"}]}"#;

    fn healthy_cli() -> MockCommandRunner {
        MockCommandRunner::new()
            .with_reply(&["--version"], MockReply::output("jf version 2.71.0"))
            .with_reply(&PING_ARGS, MockReply::output("OK"))
            .with_reply(&DRY_RUN_ARGS, MockReply::output(PENDING_MODULES))
    }

    fn outcomes(report: &CleanupReport) -> Vec<(&'static str, WorkflowOutcome)> {
        report.phases.iter().map(|p| (p.phase, p.outcome)).collect()
    }

    #[tokio::test]
    async fn test_missing_tool_skips_everything() {
        let runner = Arc::new(healthy_cli());
        let platform = Arc::new(RecordingPlatform::new());
        let summary = working_summary();
        let ctx = context(&runner, &platform, summary.clone(), FakeLocator(None), config_with_servers(&["s1"]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert_eq!(report.skipped, Some(SkipReason::ToolNotFound));
        assert_eq!(runner.call_count(), 0);
        assert_eq!(
            platform.warnings(),
            vec!["Could not find JFrog CLI executable. Skipping cleanup."]
        );
        assert_eq!(report.exit_code(), 0);
        assert!(summary.calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_servers_skips_everything() {
        let runner = Arc::new(healthy_cli());
        let platform = Arc::new(RecordingPlatform::new());
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config_with_servers(&[]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert_eq!(report.skipped, Some(SkipReason::NoServersConfigured));
        assert_eq!(runner.call_count(), 0);
        assert!(platform.warnings().is_empty());
    }

    #[tokio::test]
    #[serial]
    async fn test_full_run_in_order() {
        let runner = Arc::new(healthy_cli());
        let platform = Arc::new(RecordingPlatform::new());
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config_with_servers(&["s1"]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert_eq!(
            outcomes(&report),
            vec![
                (publish::PHASE_NAME, WorkflowOutcome::Succeeded),
                (summary::PHASE_NAME, WorkflowOutcome::Succeeded),
                (teardown::PHASE_NAME, WorkflowOutcome::Succeeded),
            ]
        );
        assert_eq!(
            runner.call_lines(),
            vec![
                "--version",
                "rt ping",
                "rt build-publish --dry-run",
                "rt build-add-git",
                "rt build-publish",
                "generate-summary-markdown",
                "c rm s1 --quiet",
            ]
        );
        assert!(platform.failures().is_empty());
        assert!(platform.groups_balanced());
    }

    #[tokio::test]
    async fn test_both_disabled_still_tears_down() {
        let runner = Arc::new(healthy_cli());
        let platform = Arc::new(
            RecordingPlatform::new()
                .with_input(AUTO_BUILD_PUBLISH_DISABLE, "true")
                .with_input(JOB_SUMMARY_DISABLE, "true"),
        );
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config_with_servers(&["a", "b"]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert_eq!(runner.call_lines(), vec!["c rm a --quiet", "c rm b --quiet"]);
        assert_eq!(
            report.phase(publish::PHASE_NAME).map(|p| p.outcome),
            Some(WorkflowOutcome::SkippedByConfig)
        );
        assert_eq!(
            platform.exports(),
            vec![(JFROG_CLI_SERVER_IDS_ENV_VAR.to_string(), String::new())]
        );
    }

    #[tokio::test]
    async fn test_old_cli_skips_post_tasks_but_tears_down() {
        let runner = Arc::new(
            MockCommandRunner::new().with_reply(&["--version"], MockReply::output("jf version 2.10.0")),
        );
        let platform = Arc::new(RecordingPlatform::new());
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config_with_servers(&["s1"]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert_eq!(
            outcomes(&report),
            vec![
                (publish::PHASE_NAME, WorkflowOutcome::SkippedByGate),
                (summary::PHASE_NAME, WorkflowOutcome::SkippedByGate),
                (teardown::PHASE_NAME, WorkflowOutcome::Succeeded),
            ]
        );
        assert_eq!(runner.call_lines(), vec!["--version", "c rm s1 --quiet"]);
    }

    #[tokio::test]
    async fn test_failed_ping_skips_post_tasks_but_tears_down() {
        let runner = Arc::new(
            MockCommandRunner::new()
                .with_reply(&["--version"], MockReply::output("jf version 2.71.0"))
                .with_reply(&PING_ARGS, MockReply::failure("jf rt ping", "connection refused")),
        );
        let platform = Arc::new(RecordingPlatform::new());
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config_with_servers(&["s1"]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert_eq!(runner.call_lines(), vec!["--version", "rt ping", "c rm s1 --quiet"]);
        assert!(!report.failed());
        assert!(platform.warnings().iter().any(|w| w.contains("connection refused")));
    }

    #[tokio::test]
    #[serial]
    async fn test_panicking_publish_does_not_block_teardown() {
        let runner = Arc::new(healthy_cli());
        runner.add_reply(&PUBLISH_ARGS, MockReply::Panic("publisher exploded".to_string()));
        let platform = Arc::new(RecordingPlatform::new());
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config_with_servers(&["s1"]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        let publish_report = report.phase(publish::PHASE_NAME).unwrap();
        assert_eq!(publish_report.outcome, WorkflowOutcome::Failed);
        assert!(publish_report
            .error
            .as_deref()
            .unwrap()
            .contains("publisher exploded"));
        assert_eq!(
            report.phase(summary::PHASE_NAME).map(|p| p.outcome),
            Some(WorkflowOutcome::Succeeded)
        );
        assert!(runner.was_called(&["c", "rm", "s1", "--quiet"]));
        assert_eq!(report.exit_code(), 0);
        assert!(platform.groups_balanced());
    }

    #[tokio::test]
    async fn test_missing_workspace_fails_publish_only() {
        let runner = Arc::new(healthy_cli());
        let platform = Arc::new(RecordingPlatform::new());
        let mut config = config_with_servers(&["s1"]);
        config.workspace = None;
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config);

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert_eq!(
            report.phase(publish::PHASE_NAME).map(|p| p.outcome),
            Some(WorkflowOutcome::Failed)
        );
        assert!(platform
            .warnings()
            .contains(&"GITHUB_WORKSPACE is not defined.".to_string()));
        assert!(runner.was_called(&GENERATE_SUMMARY_ARGS));
        assert!(runner.was_called(&["c", "rm", "s1", "--quiet"]));
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_malformed_flag_fails_post_tasks_but_tears_down() {
        let runner = Arc::new(healthy_cli());
        let platform = Arc::new(RecordingPlatform::new().with_input(JOB_SUMMARY_DISABLE, "yes"));
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config_with_servers(&["s1"]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert_eq!(
            outcomes(&report),
            vec![
                (publish::PHASE_NAME, WorkflowOutcome::Failed),
                (summary::PHASE_NAME, WorkflowOutcome::Failed),
                (teardown::PHASE_NAME, WorkflowOutcome::Succeeded),
            ]
        );
        assert_eq!(runner.call_lines(), vec!["c rm s1 --quiet"]);
    }

    #[tokio::test]
    async fn test_teardown_failure_fails_job() {
        let runner = Arc::new(
            MockCommandRunner::new()
                .with_reply(&["--version"], MockReply::output("jf version 2.10.0"))
                .with_reply(
                    &["c", "rm", "s1", "--quiet"],
                    MockReply::failure("jf c rm s1 --quiet", "permission denied"),
                ),
        );
        let platform = Arc::new(RecordingPlatform::new());
        let ctx = context(&runner, &platform, working_summary(), installed_tool(), config_with_servers(&["s1", "s2"]));

        let report = CleanupOrchestrator::new().execute(&ctx).await;

        assert!(report.failed());
        assert_eq!(report.exit_code(), 1);
        assert!(!runner.was_called(&["c", "rm", "s2", "--quiet"]));
        let failures = platform.failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].starts_with("Failed to remove server 's1'"));
        assert!(matches!(
            platform.entries().last(),
            Some(LogEntry::Failed(_))
        ));
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
