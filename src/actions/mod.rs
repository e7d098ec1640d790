//! CI platform collaborator
//!
//! The post-step talks to the CI runner through [`Platform`]: reading inputs
//! and saved step state, writing grouped log lines, exporting variables for
//! later steps, and signalling failure. [`GithubActions`] speaks the GitHub
//! Actions workflow-command protocol; [`RecordingPlatform`] keeps everything
//! in memory for tests.

pub mod github;
pub mod recording;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use github::GithubActions;
pub use recording::{LogEntry, RecordingPlatform};

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("failed to append to {}: {source}", path.display())]
    FileCommand {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("value for '{name}' contains the reserved delimiter")]
    DelimiterInValue { name: String },

    #[error("cannot add '{}' to PATH: {message}", path.display())]
    InvalidPath { path: PathBuf, message: String },
}

/// Runner-facing side effects used by the cleanup workflow
///
/// Logging methods are fire-and-forget. Only the file-command methods
/// (`export_variable`, `add_path`) report errors.
pub trait Platform: Send + Sync {
    /// Raw action input, `None` when unset or blank
    fn get_input(&self, name: &str) -> Option<String>;

    /// Value saved by the main step for this post step
    fn get_state(&self, name: &str) -> Option<String>;

    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);

    fn start_group(&self, name: &str);
    fn end_group(&self);

    /// Report the step as failed; the process exit code is the caller's job
    fn set_failed(&self, message: &str);

    /// Set `name` for this process and for the following steps of the job
    fn export_variable(&self, name: &str, value: &str) -> Result<(), PlatformError>;

    /// Prepend `dir` to `PATH` for this process and the following steps
    fn add_path(&self, dir: &Path) -> Result<(), PlatformError>;
}

/// A collapsible log section closed when the guard is dropped
#[must_use = "the group closes as soon as the guard is dropped"]
pub struct LogGroup<'a> {
    platform: &'a dyn Platform,
}

impl<'a> LogGroup<'a> {
    pub fn start(platform: &'a dyn Platform, name: &str) -> Self {
        platform.start_group(name);
        Self { platform }
    }
}

impl Drop for LogGroup<'_> {
    fn drop(&mut self) {
        self.platform.end_group();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_group_closes_on_drop() {
        let platform = RecordingPlatform::new();
        {
            let _group = LogGroup::start(&platform, "Section");
            platform.info("inside");
        }
        assert_eq!(
            platform.entries(),
            vec![
                LogEntry::GroupStart("Section".to_string()),
                LogEntry::Info("inside".to_string()),
                LogEntry::GroupEnd,
            ]
        );
    }

    #[test]
    fn test_log_group_closes_on_early_return() {
        fn body(platform: &dyn Platform) -> Result<(), String> {
            let _group = LogGroup::start(platform, "Early");
            Err("bail".to_string())
        }

        let platform = RecordingPlatform::new();
        assert!(body(&platform).is_err());
        assert!(platform.groups_balanced());
    }
}
