//! CLI version detection and minimum-version gating

use super::{CommandRunner, RunOptions};
use crate::actions::Platform;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, warn};

/// A `major.minor.patch` version of the build tool
///
/// Field order makes the derived ordering numeric major, then minor, then
/// patch. Pre-release and build suffixes are not modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ToolVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version '{0}', expected <major>.<minor>.<patch>")]
pub struct VersionParseError(pub String);

impl ToolVersion {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Find the first `<word> version X.Y.Z` token in free-form output
    pub fn extract(output: &str) -> Option<Self> {
        static VERSION_RE: OnceLock<Regex> = OnceLock::new();
        let re = VERSION_RE
            .get_or_init(|| Regex::new(r"\w+ version (\d+)\.(\d+)\.(\d+)").expect("valid regex"));

        let caps = re.captures(output)?;
        Some(Self {
            major: caps[1].parse().ok()?,
            minor: caps[2].parse().ok()?,
            patch: caps[3].parse().ok()?,
        })
    }
}

impl FromStr for ToolVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VersionParseError(s.to_string());
        let mut parts = s.trim().split('.');
        let mut next = || -> Result<u64, VersionParseError> {
            parts
                .next()
                .and_then(|p| p.parse::<u64>().ok())
                .ok_or_else(invalid)
        };
        let version = Self::new(next()?, next()?, next()?);
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(version)
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Checks the installed CLI against a minimum version
///
/// Fails closed: any problem running `--version` or reading its output means
/// the gate is not satisfied. One invocation per check, no retries.
pub struct VersionGate<'a> {
    runner: &'a dyn CommandRunner,
    platform: Option<&'a dyn Platform>,
}

impl<'a> VersionGate<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            platform: None,
        }
    }

    /// Also report a failed `--version` call as a runner warning
    pub fn reporting_to(mut self, platform: &'a dyn Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// The version the CLI reports about itself, if recognizable
    pub async fn installed_version(&self) -> Option<ToolVersion> {
        let output = match self.runner.run(&["--version"], &RunOptions::silent()).await {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "Could not query the CLI version");
                if let Some(platform) = self.platform {
                    platform.warning(&format!("Failed to get JFrog CLI version: {}", e));
                }
                return None;
            }
        };

        if output.trim().is_empty() {
            debug!("CLI version command produced no output");
            return None;
        }

        let version = ToolVersion::extract(&output);
        if version.is_none() {
            debug!(output = %output.trim(), "No version token in CLI output");
        }
        version
    }

    pub async fn is_satisfied(&self, minimum: &ToolVersion) -> bool {
        match self.installed_version().await {
            Some(installed) => {
                debug!(%installed, %minimum, "Comparing CLI version");
                installed >= *minimum
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::RecordingPlatform;
    use crate::tool::{MockCommandRunner, MockReply};

    #[test]
    fn test_extract_from_cli_output() {
        assert_eq!(
            ToolVersion::extract("jf version 2.66.0"),
            Some(ToolVersion::new(2, 66, 0))
        );
        assert_eq!(
            ToolVersion::extract("some banner\njfrog version 2.53.10\n"),
            Some(ToolVersion::new(2, 53, 10))
        );
    }

    #[test]
    fn test_extract_rejects_unrecognized_output() {
        assert_eq!(ToolVersion::extract(""), None);
        assert_eq!(ToolVersion::extract("2.66.0"), None);
        assert_eq!(ToolVersion::extract("jf version two"), None);
        assert_eq!(ToolVersion::extract("jf version 2.66"), None);
    }

    #[test]
    fn test_ordering_is_numeric() {
        let v = |s: &str| s.parse::<ToolVersion>().unwrap();
        assert!(v("2.10.0") > v("2.9.9"));
        assert!(v("3.0.0") > v("2.99.99"));
        assert!(v("2.66.1") > v("2.66.0"));
        assert_eq!(v("2.66.0"), v("2.66.0"));
    }

    #[test]
    fn test_parse_and_display() {
        let version: ToolVersion = "2.66.0".parse().unwrap();
        assert_eq!(version.to_string(), "2.66.0");
        assert!("2.66".parse::<ToolVersion>().is_err());
        assert!("2.66.0.1".parse::<ToolVersion>().is_err());
        assert!("a.b.c".parse::<ToolVersion>().is_err());
    }

    #[tokio::test]
    async fn test_gate_satisfied_at_and_above_minimum() {
        let minimum = ToolVersion::new(2, 66, 0);
        for (reported, expected) in [
            ("jf version 2.66.0", true),
            ("jf version 2.67.3", true),
            ("jf version 3.0.0", true),
            ("jf version 2.65.9", false),
            ("jf version 1.99.99", false),
        ] {
            let runner =
                MockCommandRunner::new().with_reply(&["--version"], MockReply::output(reported));
            let gate = VersionGate::new(&runner);
            assert_eq!(gate.is_satisfied(&minimum).await, expected, "{reported}");
            assert_eq!(runner.call_count(), 1);
        }
    }

    #[tokio::test]
    async fn test_gate_fails_closed() {
        let minimum = ToolVersion::new(2, 66, 0);

        let runner = MockCommandRunner::new();
        assert!(!VersionGate::new(&runner).is_satisfied(&minimum).await);

        let runner = MockCommandRunner::new()
            .with_reply(&["--version"], MockReply::output("unexpected banner"));
        assert!(!VersionGate::new(&runner).is_satisfied(&minimum).await);

        let runner = MockCommandRunner::new()
            .with_reply(&["--version"], MockReply::failure("jf --version", "boom"));
        assert!(!VersionGate::new(&runner).is_satisfied(&minimum).await);
    }

    #[tokio::test]
    async fn test_failed_query_is_reported_to_platform() {
        let minimum = ToolVersion::new(2, 66, 0);
        let platform = RecordingPlatform::new();

        let runner = MockCommandRunner::new()
            .with_reply(&["--version"], MockReply::failure("jf --version", "exec format error"));
        let gate = VersionGate::new(&runner).reporting_to(&platform);
        assert!(!gate.is_satisfied(&minimum).await);

        assert_eq!(platform.warnings().len(), 1);
        assert!(platform.warnings()[0].starts_with("Failed to get JFrog CLI version"));
        assert!(platform.warnings()[0].contains("exec format error"));
    }

    #[tokio::test]
    async fn test_unrecognized_output_is_not_a_warning() {
        let platform = RecordingPlatform::new();
        let runner =
            MockCommandRunner::new().with_reply(&["--version"], MockReply::output("dev build"));

        let gate = VersionGate::new(&runner).reporting_to(&platform);
        assert_eq!(gate.installed_version().await, None);
        assert!(platform.warnings().is_empty());
    }
}
