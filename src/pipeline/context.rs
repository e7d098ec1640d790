//! Long-lived dependencies shared by every cleanup phase

use std::sync::Arc;

use crate::actions::Platform;
use crate::config::CleanupConfig;
use crate::summary::SummaryRenderer;
use crate::tool::{CommandRunner, ToolLocator};

pub struct CleanupContext {
    /// Build-tool subprocess runner
    pub runner: Arc<dyn CommandRunner>,

    /// CI runner logging, inputs and file commands
    pub platform: Arc<dyn Platform>,

    /// Job summary publisher
    pub summary: Arc<dyn SummaryRenderer>,

    /// Finds the CLI installed by the main step
    pub locator: Arc<dyn ToolLocator>,

    pub config: CleanupConfig,
}

impl CleanupContext {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        platform: Arc<dyn Platform>,
        summary: Arc<dyn SummaryRenderer>,
        locator: Arc<dyn ToolLocator>,
        config: CleanupConfig,
    ) -> Self {
        Self {
            runner,
            platform,
            summary,
            locator,
            config,
        }
    }
}
