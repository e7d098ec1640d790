//! Locating the CLI installed by the main step

use crate::actions::Platform;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::jfrog::JF_EXECUTABLE;

/// State key the main step may save with the CLI directory
pub const CLI_PATH_STATE: &str = "cli-path";

/// `latest` is cached under this version by the main step
pub const LATEST_CACHE_VERSION: &str = "100.100.100";

pub const LATEST_CLI_VERSION: &str = "latest";

/// Finds a usable CLI installation, making it callable on success
pub trait ToolLocator: Send + Sync {
    /// Directory holding the CLI executable, or `None` when it is not installed
    fn locate(&self) -> Option<PathBuf>;
}

/// Looks up the CLI through saved step state, then the runner tool cache
///
/// A tool-cache entry counts only when its `<dir>.complete` marker exists,
/// the same way the runner's tool cache validates entries. The found
/// directory is added to `PATH`.
pub struct ToolCacheLocator {
    platform: Arc<dyn Platform>,
    cache_root: Option<PathBuf>,
    version: String,
}

impl ToolCacheLocator {
    pub fn new(platform: Arc<dyn Platform>, cache_root: Option<PathBuf>, version: &str) -> Self {
        Self {
            platform,
            cache_root,
            version: version.to_string(),
        }
    }

    fn from_state(&self) -> Option<PathBuf> {
        let dir = PathBuf::from(self.platform.get_state(CLI_PATH_STATE)?);
        if dir.join(executable_file_name()).is_file() {
            Some(dir)
        } else {
            debug!(dir = %dir.display(), "Saved CLI path has no executable");
            None
        }
    }

    fn from_tool_cache(&self) -> Option<PathBuf> {
        let root = self.cache_root.as_ref()?;
        let dir = cache_dir(root, JF_EXECUTABLE, &self.version, runner_arch());
        let marker = completion_marker(&dir);
        if dir.is_dir() && marker.is_file() {
            Some(dir)
        } else {
            debug!(dir = %dir.display(), "No completed tool-cache entry");
            None
        }
    }
}

impl ToolLocator for ToolCacheLocator {
    fn locate(&self) -> Option<PathBuf> {
        let dir = self.from_state().or_else(|| self.from_tool_cache())?;
        if let Err(e) = self.platform.add_path(&dir) {
            warn!(error = %e, "Could not add CLI directory to PATH");
            return None;
        }
        Some(dir)
    }
}

/// `<root>/<tool>/<version>/<arch>`
pub fn cache_dir(root: &Path, tool: &str, version: &str, arch: &str) -> PathBuf {
    let version = if version == LATEST_CLI_VERSION {
        LATEST_CACHE_VERSION
    } else {
        version.trim_start_matches('v')
    };
    root.join(tool).join(version).join(arch)
}

pub fn completion_marker(dir: &Path) -> PathBuf {
    let mut marker = dir.as_os_str().to_os_string();
    marker.push(".complete");
    PathBuf::from(marker)
}

/// Architecture names as the runner tool cache spells them
pub fn runner_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        "powerpc64" => "ppc64",
        other => other,
    }
}

fn executable_file_name() -> String {
    if cfg!(windows) {
        format!("{}.exe", JF_EXECUTABLE)
    } else {
        JF_EXECUTABLE.to_string()
    }
}
