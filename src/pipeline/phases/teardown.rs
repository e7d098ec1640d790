use crate::actions::LogGroup;
use crate::config::JFROG_CLI_SERVER_IDS_ENV_VAR;
use crate::pipeline::context::CleanupContext;
use crate::pipeline::outcome::WorkflowOutcome;
use crate::pipeline::phase_trait::CleanupPhase;
use crate::pipeline::CleanupError;
use crate::tool::RunOptions;
use anyhow::{Context, Result};
use async_trait::async_trait;

pub const PHASE_NAME: &str = "remove-servers";

/// Removes every server configuration the main step registered
///
/// Stops at the first failed removal. On success the server list is exported
/// empty so a second cleanup finds nothing to do.
pub struct CredentialTeardownPhase;

#[async_trait]
impl CleanupPhase for CredentialTeardownPhase {
    fn name(&self) -> &'static str {
        PHASE_NAME
    }

    async fn execute(&self, context: &CleanupContext) -> Result<WorkflowOutcome> {
        let platform = context.platform.as_ref();
        let _group = LogGroup::start(platform, "Cleanup JFrog CLI servers configuration");

        for server_id in &context.config.server_ids {
            platform.debug(&format!("Removing server ID: '{}'...", server_id));
            context
                .runner
                .run(&["c", "rm", server_id.as_str(), "--quiet"], &RunOptions::default())
                .await
                .map_err(|e| CleanupError::ServerRemoval {
                    server_id: server_id.clone(),
                    message: e.to_string(),
                })?;
        }

        platform
            .export_variable(JFROG_CLI_SERVER_IDS_ENV_VAR, "")
            .context("Failed to clear the configured server list")?;

        Ok(WorkflowOutcome::Succeeded)
    }
}
