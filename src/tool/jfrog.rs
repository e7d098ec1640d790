//! JFrog CLI subprocess runner

use super::{display_command, CommandError, CommandRunner, RunOptions};
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Executable name of the JFrog CLI
pub const JF_EXECUTABLE: &str = "jf";

/// Runs the JFrog CLI as a child process
///
/// The program is resolved through `PATH` unless constructed with an explicit
/// path. Output is captured; non-silent invocations echo it to our own
/// stdout/stderr afterwards so it lands in the job log.
#[derive(Debug, Clone)]
pub struct JfrogCli {
    program: PathBuf,
}

impl JfrogCli {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(JF_EXECUTABLE),
        }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl Default for JfrogCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for JfrogCli {
    async fn run(&self, args: &[&str], options: &RunOptions) -> Result<String, CommandError> {
        let command_line = display_command(&self.program.display().to_string(), args);
        if options.silent {
            debug!(command = %command_line, "Running CLI command");
        } else {
            info!(command = %command_line, "Running CLI command");
            println!("[command]{}", command_line);
        }

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(cwd) = &options.cwd {
            command.current_dir(cwd);
        }

        let output = command.output().await.map_err(|e| CommandError::Spawn {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

        if !options.silent {
            let _ = std::io::stdout().write_all(&output.stdout);
            let _ = std::io::stderr().write_all(&output.stderr);
        }

        if !output.status.success() {
            return Err(CommandError::NonZeroExit {
                command: command_line,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| CommandError::InvalidOutput {
            command: command_line,
        })
    }
}
