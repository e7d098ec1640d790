//! Automatic build-info publishing
//!
//! Publishing is lenient: a failed `rt build-publish` is logged as a warning
//! and the phase reports `SucceededWithWarning`. The only error that ends the
//! phase is a missing workspace, since every command here runs inside it.

use super::detector::UnpublishedWorkDetector;
use crate::actions::LogGroup;
use crate::config::JFROG_CLI_USAGE_AUTO_BUILD_PUBLISHED_ENV;
use crate::pipeline::context::CleanupContext;
use crate::pipeline::outcome::WorkflowOutcome;
use crate::pipeline::phase_trait::CleanupPhase;
use crate::pipeline::CleanupError;
use crate::tool::RunOptions;
use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

pub const PHASE_NAME: &str = "publish-build-info";

pub const ADD_GIT_ARGS: [&str; 2] = ["rt", "build-add-git"];
pub const PUBLISH_ARGS: [&str; 2] = ["rt", "build-publish"];

pub struct BuildInfoPublishPhase;

#[async_trait]
impl CleanupPhase for BuildInfoPublishPhase {
    fn name(&self) -> &'static str {
        PHASE_NAME
    }

    async fn execute(&self, context: &CleanupContext) -> Result<WorkflowOutcome> {
        let platform = context.platform.as_ref();
        let runner = context.runner.as_ref();
        let workspace = context
            .config
            .workspace
            .clone()
            .ok_or(CleanupError::MissingWorkspace)?;

        let detector = UnpublishedWorkDetector::new(runner, platform);
        if !detector.has_unpublished_modules(&workspace).await {
            info!("No unpublished build modules, nothing to publish");
            return Ok(WorkflowOutcome::SkippedByGate);
        }

        let mut warned = false;

        {
            let _group = LogGroup::start(platform, "Collect the Git information");
            if let Err(e) = runner.run(&ADD_GIT_ARGS, &RunOptions::in_dir(&workspace)).await {
                platform.warning(&format!(
                    "Failed while attempting to collect Git information: {}",
                    e
                ));
                warned = true;
            }
        }

        {
            let _group = LogGroup::start(platform, "Publish the build info to JFrog Artifactory");
            // Lets the CLI's usage report count automatic publications.
            if let Err(e) = platform.export_variable(JFROG_CLI_USAGE_AUTO_BUILD_PUBLISHED_ENV, "TRUE") {
                debug!(error = %e, "Could not export the auto-publish usage marker");
            }
            if let Err(e) = runner.run(&PUBLISH_ARGS, &RunOptions::in_dir(&workspace)).await {
                platform.warning(&format!(
                    "Failed while attempting to publish the build info to JFrog Artifactory: {}",
                    e
                ));
                warned = true;
            }
        }

        Ok(if warned {
            WorkflowOutcome::SucceededWithWarning
        } else {
            WorkflowOutcome::Succeeded
        })
    }
}
