//! GitHub Actions workflow commands
//!
//! Log lines and groups go to stdout as `::command::data` lines. Variables and
//! path entries for later steps are appended to the files named by
//! `GITHUB_ENV` and `GITHUB_PATH`, falling back to the deprecated inline
//! commands when those are not set.

use super::{Platform, PlatformError};
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

pub const GITHUB_ENV: &str = "GITHUB_ENV";
pub const GITHUB_PATH: &str = "GITHUB_PATH";

#[derive(Debug, Clone, Default)]
pub struct GithubActions {
    env_file: Option<PathBuf>,
    path_file: Option<PathBuf>,
}

impl GithubActions {
    /// Pick up the runner's file-command locations from the environment
    pub fn from_env() -> Self {
        Self {
            env_file: non_empty_var(GITHUB_ENV).map(PathBuf::from),
            path_file: non_empty_var(GITHUB_PATH).map(PathBuf::from),
        }
    }

    pub fn with_files(env_file: Option<PathBuf>, path_file: Option<PathBuf>) -> Self {
        Self {
            env_file,
            path_file,
        }
    }

    fn command(&self, name: &str, data: &str) {
        println!("::{}::{}", name, escape_data(data));
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

/// Input names map to `INPUT_<NAME>` with spaces as underscores, upper-cased
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

pub fn state_env_name(name: &str) -> String {
    format!("STATE_{}", name)
}

pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn append_line(path: &Path, contents: &str) -> Result<(), PlatformError> {
    let to_err = |source| PlatformError::FileCommand {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_err)?;
    file.write_all(contents.as_bytes()).map_err(to_err)
}

/// `name<<delimiter` heredoc entry understood by the runner's env file parser
pub fn env_file_entry(name: &str, value: &str) -> Result<String, PlatformError> {
    let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
    if name.contains(&delimiter) || value.contains(&delimiter) {
        return Err(PlatformError::DelimiterInValue {
            name: name.to_string(),
        });
    }
    Ok(format!(
        "{name}<<{delimiter}\n{value}\n{delimiter}\n",
        name = name,
        delimiter = delimiter,
        value = value
    ))
}

impl Platform for GithubActions {
    fn get_input(&self, name: &str) -> Option<String> {
        env::var(input_env_name(name))
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_state(&self, name: &str) -> Option<String> {
        non_empty_var(&state_env_name(name))
    }

    fn debug(&self, message: &str) {
        self.command("debug", message);
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        self.command("warning", message);
    }

    fn error(&self, message: &str) {
        self.command("error", message);
    }

    fn start_group(&self, name: &str) {
        self.command("group", name);
    }

    fn end_group(&self) {
        println!("::endgroup::");
    }

    fn set_failed(&self, message: &str) {
        self.error(message);
    }

    fn export_variable(&self, name: &str, value: &str) -> Result<(), PlatformError> {
        env::set_var(name, value);
        match &self.env_file {
            Some(path) => {
                debug!(name, file = %path.display(), "Exporting variable");
                append_line(path, &env_file_entry(name, value)?)
            }
            None => {
                println!("::set-env name={}::{}", name, escape_data(value));
                Ok(())
            }
        }
    }

    fn add_path(&self, dir: &Path) -> Result<(), PlatformError> {
        let mut paths = vec![dir.to_path_buf()];
        if let Some(current) = env::var_os("PATH") {
            paths.extend(env::split_paths(&current));
        }
        let joined = env::join_paths(paths).map_err(|e| PlatformError::InvalidPath {
            path: dir.to_path_buf(),
            message: e.to_string(),
        })?;
        env::set_var("PATH", joined);

        match &self.path_file {
            Some(path) => append_line(path, &format!("{}\n", dir.display())),
            None => {
                println!("::add-path::{}", dir.display());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("plain"), "plain");
        assert_eq!(escape_data("50%"), "50%25");
        assert_eq!(escape_data("a\nb\r\nc"), "a%0Ab%0D%0Ac");
    }

    #[test]
    fn test_input_env_name() {
        assert_eq!(
            input_env_name("disable-auto-build-publish"),
            "INPUT_DISABLE-AUTO-BUILD-PUBLISH"
        );
        assert_eq!(input_env_name("my input"), "INPUT_MY_INPUT");
    }

    #[test]
    fn test_env_file_entry_uses_heredoc() {
        let entry = env_file_entry("JFROG_CLI_SERVER_IDS", "").unwrap();
        let lines: Vec<&str> = entry.lines().collect();
        assert_eq!(lines.len(), 3);
        let delimiter = lines[0].strip_prefix("JFROG_CLI_SERVER_IDS<<").unwrap();
        assert!(delimiter.starts_with("ghadelimiter_"));
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], delimiter);
    }
}
