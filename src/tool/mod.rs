//! Build-tool invocation
//!
//! Everything this crate asks of the JFrog CLI goes through the
//! [`CommandRunner`] trait: a single subprocess invocation that either returns
//! its stdout or fails with a [`CommandError`]. The CLI itself is opaque; we
//! never interpret its behavior beyond exit status and stdout.

pub mod jfrog;
pub mod locator;
pub mod mock;
pub mod version;

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub use jfrog::JfrogCli;
pub use locator::{ToolCacheLocator, ToolLocator};
pub use mock::{MockCommandRunner, MockReply, RecordedCall};
pub use version::{ToolVersion, VersionGate};

/// Options for a single CLI invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Working directory for the subprocess (inherits ours when unset)
    pub cwd: Option<PathBuf>,

    /// Suppress echoing the command output into the job log
    pub silent: bool,
}

impl RunOptions {
    pub fn in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            silent: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            cwd: None,
            silent: true,
        }
    }

    pub fn silent_in_dir(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: Some(cwd.into()),
            silent: true,
        }
    }
}

/// Errors from invoking the build tool
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    /// The process could not be started at all
    #[error("failed to start '{command}': {message}")]
    Spawn { command: String, message: String },

    /// The process ran and exited unsuccessfully
    #[error("'{command}' failed with exit code {}: {stderr}", exit_code_text(.code))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// stdout was not valid UTF-8
    #[error("'{command}' produced non UTF-8 output")]
    InvalidOutput { command: String },
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "<signal>".to_string(),
    }
}

/// Runs build-tool subcommands
///
/// Implementations must attempt each call exactly once. Retrying is never the
/// runner's decision.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the tool with `args` and return its stdout
    async fn run(&self, args: &[&str], options: &RunOptions) -> Result<String, CommandError>;
}

/// Render an argument list the way it appears in the job log
pub fn display_command(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_constructors() {
        assert_eq!(RunOptions::default().cwd, None);
        assert!(!RunOptions::default().silent);

        let opts = RunOptions::in_dir("/repo");
        assert_eq!(opts.cwd, Some(PathBuf::from("/repo")));
        assert!(!opts.silent);

        let opts = RunOptions::silent_in_dir("/repo");
        assert_eq!(opts.cwd, Some(PathBuf::from("/repo")));
        assert!(opts.silent);
    }

    #[test]
    fn test_non_zero_exit_display() {
        let err = CommandError::NonZeroExit {
            command: "jf rt ping".to_string(),
            code: Some(1),
            stderr: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'jf rt ping' failed with exit code 1: connection refused"
        );

        let err = CommandError::NonZeroExit {
            command: "jf rt ping".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("<signal>"));
    }

    #[test]
    fn test_display_command() {
        assert_eq!(
            display_command("jf", &["rt", "build-publish", "--dry-run"]),
            "jf rt build-publish --dry-run"
        );
        assert_eq!(display_command("jf", &[]), "jf");
    }
}
