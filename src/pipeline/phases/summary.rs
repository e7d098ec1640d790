use crate::actions::LogGroup;
use crate::pipeline::context::CleanupContext;
use crate::pipeline::outcome::WorkflowOutcome;
use crate::pipeline::phase_trait::CleanupPhase;
use crate::tool::RunOptions;
use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

pub const PHASE_NAME: &str = "job-summary";

pub const GENERATE_SUMMARY_ARGS: [&str; 1] = ["generate-summary-markdown"];

/// Renders the CLI's command summaries into the job summary
///
/// Every step here is best effort: failures become warnings and the phase
/// reports `SucceededWithWarning`.
pub struct JobSummaryPhase;

#[async_trait]
impl CleanupPhase for JobSummaryPhase {
    fn name(&self) -> &'static str {
        PHASE_NAME
    }

    async fn execute(&self, context: &CleanupContext) -> Result<WorkflowOutcome> {
        let platform = context.platform.as_ref();
        let _group = LogGroup::start(platform, "Generating Job Summary");
        let mut warned = false;

        match context
            .runner
            .run(&GENERATE_SUMMARY_ARGS, &RunOptions::default())
            .await
        {
            Err(e) => {
                platform.warning(&format!("Failed to generate summary markdown: {}", e));
                warned = true;
            }
            Ok(_) => {
                match context.summary.publish().await {
                    Ok(true) => {}
                    Ok(false) => {
                        platform.warning("No job summary markdown was generated");
                        warned = true;
                    }
                    Err(e) => {
                        platform.warning(&format!(
                            "Failed while attempting to generate job summary: {:#}",
                            e
                        ));
                        warned = true;
                    }
                }

                match context.summary.populate_code_scanning().await {
                    Ok(true) => platform.info("SARIF file uploaded successfully"),
                    Ok(false) => debug!("No SARIF report to upload"),
                    Err(e) => {
                        platform.warning(&format!(
                            "Failed to populate the code scanning tab: {:#}",
                            e
                        ));
                        warned = true;
                    }
                }
            }
        }

        if let Err(e) = context.summary.clear_artifacts().await {
            platform.warning(&format!("Failed to clear command summary files: {:#}", e));
            warned = true;
        }

        Ok(if warned {
            WorkflowOutcome::SucceededWithWarning
        } else {
            WorkflowOutcome::Succeeded
        })
    }
}
