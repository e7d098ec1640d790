use super::context::CleanupContext;
use super::outcome::WorkflowOutcome;
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CleanupPhase: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, context: &CleanupContext) -> Result<WorkflowOutcome>;
}
