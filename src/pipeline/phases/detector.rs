//! Unpublished build-info detection
//!
//! Runs `rt build-publish --dry-run` and looks for a non-empty `modules`
//! array in its JSON output. The dry run would otherwise record a command
//! summary of its own, so the summary output directory is blanked for the
//! duration of the call and restored afterwards.

use crate::actions::{LogGroup, Platform};
use crate::config::JFROG_CLI_COMMAND_SUMMARY_OUTPUT_DIR_ENV;
use crate::env_scope::EnvOverride;
use crate::tool::{CommandRunner, RunOptions};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

pub const DRY_RUN_ARGS: [&str; 3] = ["rt", "build-publish", "--dry-run"];

pub struct UnpublishedWorkDetector<'a> {
    runner: &'a dyn CommandRunner,
    platform: &'a dyn Platform,
}

impl<'a> UnpublishedWorkDetector<'a> {
    pub fn new(runner: &'a dyn CommandRunner, platform: &'a dyn Platform) -> Self {
        Self { runner, platform }
    }

    /// Whether the CLI holds build modules for `working_dir` not yet published
    ///
    /// Never fails: any error is logged and reported as "nothing to publish".
    pub async fn has_unpublished_modules(&self, working_dir: &Path) -> bool {
        let _group = LogGroup::start(self.platform, "Check for unpublished modules");
        match self.probe(working_dir).await {
            Ok(found) => {
                debug!(found, dir = %working_dir.display(), "Unpublished modules probe finished");
                found
            }
            Err(e) => {
                self.platform.warning(&format!(
                    "Failed to check if there are any unpublished modules: {:#}",
                    e
                ));
                false
            }
        }
    }

    async fn probe(&self, working_dir: &Path) -> Result<bool> {
        let output = {
            let _summary_off = EnvOverride::set(JFROG_CLI_COMMAND_SUMMARY_OUTPUT_DIR_ENV, "");
            self.runner
                .run(&DRY_RUN_ARGS, &RunOptions::silent_in_dir(working_dir))
                .await?
        };
        modules_present(&output)
    }
}

/// True only for a JSON object whose `modules` is a non-empty array
pub fn modules_present(response: &str) -> Result<bool> {
    let value: Value =
        serde_json::from_str(response).context("Dry-run output is not valid JSON")?;
    Ok(value
        .get("modules")
        .and_then(Value::as_array)
        .map_or(false, |modules| !modules.is_empty()))
}
