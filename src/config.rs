//! Configuration for the cleanup post-step
//!
//! Static settings come from the environment with defaults, the same way for
//! every run. Feature flags are action inputs and are read through the
//! [`Platform`] when the publish-and-summarize phase starts, so a malformed
//! flag fails that phase only.
//!
//! # Environment Variables
//!
//! - `INPUT_VERSION`: CLI version installed by the main step - default: "latest"
//! - `POSTFLIGHT_MIN_CLI_VERSION`: minimum CLI version for build-info post tasks - default: "2.66.0"
//! - `JFROG_CLI_SERVER_IDS`: comma-separated server IDs configured by the main step
//! - `GITHUB_WORKSPACE`: working directory for build-info collection
//! - `RUNNER_TOOL_CACHE`: runner tool cache root
//! - `GITHUB_STEP_SUMMARY`: file receiving the job summary markdown
//! - `JFROG_CLI_COMMAND_SUMMARY_OUTPUT_DIR`: where the CLI writes command summaries

use crate::actions::Platform;
use crate::tool::version::ToolVersion;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Input disabling automatic build-info publishing
pub const AUTO_BUILD_PUBLISH_DISABLE: &str = "disable-auto-build-publish";
/// Input disabling the job summary
pub const JOB_SUMMARY_DISABLE: &str = "disable-job-summary";
/// Input naming the CLI version the main step installed
pub const CLI_VERSION_ARG: &str = "version";

pub const JFROG_CLI_SERVER_IDS_ENV_VAR: &str = "JFROG_CLI_SERVER_IDS";
pub const JFROG_CLI_COMMAND_SUMMARY_OUTPUT_DIR_ENV: &str = "JFROG_CLI_COMMAND_SUMMARY_OUTPUT_DIR";
pub const JFROG_CLI_USAGE_AUTO_BUILD_PUBLISHED_ENV: &str = "JFROG_CLI_USAGE_AUTO_BUILD_PUBLISHED";
pub const MIN_CLI_VERSION_ENV: &str = "POSTFLIGHT_MIN_CLI_VERSION";
pub const GITHUB_WORKSPACE_ENV: &str = "GITHUB_WORKSPACE";
pub const GITHUB_STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";
pub const RUNNER_TOOL_CACHE_ENV: &str = "RUNNER_TOOL_CACHE";

const DEFAULT_CLI_VERSION: &str = "latest";
const DEFAULT_MIN_CLI_VERSION: &str = "2.66.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A boolean input outside the accepted spellings
    #[error("Input '{name}' does not meet YAML 1.2 \"Core Schema\" specification: {value}. Support boolean input list: `true | True | TRUE | false | False | FALSE`")]
    InvalidBoolean { name: String, value: String },

    #[error("Invalid minimum CLI version '{0}', expected <major>.<minor>.<patch>")]
    InvalidVersion(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Settings for one cleanup run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    /// CLI version the main step installed (`latest` or `X.Y.Z`)
    pub cli_version: String,

    /// Minimum CLI version for auto-publish and job summary
    pub min_cli_version: String,

    /// Server IDs configured by the main step, in order
    pub server_ids: Vec<String>,

    /// Working directory for build-info commands
    pub workspace: Option<PathBuf>,

    /// Runner tool cache root
    pub tool_cache: Option<PathBuf>,

    /// Job summary file provided by the runner
    pub step_summary: Option<PathBuf>,

    /// Directory the CLI writes command summaries under
    pub command_summary_dir: Option<PathBuf>,
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Default for CleanupConfig {
    /// Loads the configuration from the environment, with defaults for
    /// anything unset
    fn default() -> Self {
        let cli_version = non_empty_var("INPUT_VERSION")
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_CLI_VERSION.to_string());

        let min_cli_version = non_empty_var(MIN_CLI_VERSION_ENV)
            .map(|v| v.trim().to_string())
            .unwrap_or_else(|| DEFAULT_MIN_CLI_VERSION.to_string());

        let server_ids = env::var(JFROG_CLI_SERVER_IDS_ENV_VAR)
            .map(|v| parse_server_ids(&v))
            .unwrap_or_default();

        Self {
            cli_version,
            min_cli_version,
            server_ids,
            workspace: non_empty_var(GITHUB_WORKSPACE_ENV).map(PathBuf::from),
            tool_cache: non_empty_var(RUNNER_TOOL_CACHE_ENV).map(PathBuf::from),
            step_summary: non_empty_var(GITHUB_STEP_SUMMARY_ENV).map(PathBuf::from),
            command_summary_dir: non_empty_var(JFROG_CLI_COMMAND_SUMMARY_OUTPUT_DIR_ENV)
                .map(PathBuf::from),
        }
    }
}

impl CleanupConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the minimum version does not parse or the
    /// CLI version is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.min_version()?;
        if self.cli_version.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "CLI version must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn min_version(&self) -> Result<ToolVersion, ConfigError> {
        self.min_cli_version
            .parse()
            .map_err(|_| ConfigError::InvalidVersion(self.min_cli_version.clone()))
    }

    /// A config with no servers and no runner paths, for building in tests
    pub fn empty() -> Self {
        Self {
            cli_version: DEFAULT_CLI_VERSION.to_string(),
            min_cli_version: DEFAULT_MIN_CLI_VERSION.to_string(),
            server_ids: Vec::new(),
            workspace: None,
            tool_cache: None,
            step_summary: None,
            command_summary_dir: None,
        }
    }
}

impl fmt::Display for CleanupConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleanup Configuration:")?;
        writeln!(f, "  CLI Version: {}", self.cli_version)?;
        writeln!(f, "  Minimum CLI Version: {}", self.min_cli_version)?;
        writeln!(f, "  Servers: {}", self.server_ids.len())?;
        if let Some(ref dir) = self.workspace {
            writeln!(f, "  Workspace: {}", dir.display())?;
        }
        if let Some(ref dir) = self.tool_cache {
            writeln!(f, "  Tool Cache: {}", dir.display())?;
        }
        Ok(())
    }
}

/// Comma-separated IDs, blanks dropped
pub fn parse_server_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Feature switches provided as action inputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureFlags {
    pub disable_auto_build_publish: bool,
    pub disable_job_summary: bool,
}

impl FeatureFlags {
    pub fn read(platform: &dyn Platform) -> Result<Self, ConfigError> {
        Ok(Self {
            disable_auto_build_publish: boolean_input(platform, AUTO_BUILD_PUBLISH_DISABLE)?,
            disable_job_summary: boolean_input(platform, JOB_SUMMARY_DISABLE)?,
        })
    }
}

/// Boolean input with the runner's accepted spellings; unset is `false`
pub fn boolean_input(platform: &dyn Platform, name: &str) -> Result<bool, ConfigError> {
    parse_boolean_input(name, platform.get_input(name).as_deref())
}

pub fn parse_boolean_input(name: &str, value: Option<&str>) -> Result<bool, ConfigError> {
    match value.map(str::trim) {
        None | Some("") => Ok(false),
        Some("true" | "True" | "TRUE") => Ok(true),
        Some("false" | "False" | "FALSE") => Ok(false),
        Some(other) => Err(ConfigError::InvalidBoolean {
            name: name.to_string(),
            value: other.to_string(),
        }),
    }
}
