use super::commands::ProbeArgs;
use crate::actions::{GithubActions, Platform, RecordingPlatform};
use crate::config::CleanupConfig;
use crate::pipeline::phases::UnpublishedWorkDetector;
use crate::pipeline::{CleanupContext, CleanupOrchestrator};
use crate::summary::StepSummaryRenderer;
use crate::tool::{CommandRunner, JfrogCli, ToolCacheLocator, ToolVersion, VersionGate};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub async fn handle_cleanup() -> i32 {
    let config = CleanupConfig::default();
    debug!("{}", config);
    // Invalid settings only fail the post tasks that use them; teardown still runs.
    if let Err(e) = config.validate() {
        warn!(error = %e, "Configuration is invalid");
    }

    let platform: Arc<dyn Platform> = Arc::new(GithubActions::from_env());
    let locator = ToolCacheLocator::new(
        platform.clone(),
        config.tool_cache.clone(),
        &config.cli_version,
    );
    let summary = StepSummaryRenderer::from_config(&config);
    let context = CleanupContext::new(
        Arc::new(JfrogCli::new()),
        platform,
        Arc::new(summary),
        Arc::new(locator),
        config,
    );

    let report = CleanupOrchestrator::new().execute(&context).await;
    for phase in &report.phases {
        info!(
            phase = phase.phase,
            outcome = %phase.outcome,
            elapsed_ms = phase.duration.as_millis() as u64,
            "Phase result"
        );
    }
    report.exit_code()
}

#[derive(Debug, Serialize)]
pub struct ProbeReport {
    pub installed_version: Option<ToolVersion>,
    pub minimum_version: ToolVersion,
    pub version_satisfied: bool,
    pub working_dir: PathBuf,
    pub unpublished_modules: bool,
    pub warnings: Vec<String>,
}

/// Version check and dry run, reported without touching the job log
pub async fn probe(
    runner: &dyn CommandRunner,
    working_dir: &Path,
    minimum: ToolVersion,
) -> ProbeReport {
    let platform = RecordingPlatform::new();
    let installed_version = VersionGate::new(runner)
        .reporting_to(&platform)
        .installed_version()
        .await;
    let unpublished_modules = UnpublishedWorkDetector::new(runner, &platform)
        .has_unpublished_modules(working_dir)
        .await;

    ProbeReport {
        installed_version,
        minimum_version: minimum,
        version_satisfied: installed_version.map_or(false, |v| v >= minimum),
        working_dir: working_dir.to_path_buf(),
        unpublished_modules,
        warnings: platform.warnings(),
    }
}

pub async fn handle_probe(args: &ProbeArgs) -> i32 {
    let config = CleanupConfig::default();
    let minimum = match args.min_version {
        Some(v) => v,
        None => match config.min_version() {
            Ok(v) => v,
            Err(e) => {
                error!("{}", e);
                return 2;
            }
        },
    };
    let working_dir = match args.dir.clone().or(config.workspace) {
        Some(dir) => dir,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                error!("Cannot determine the current directory: {}", e);
                return 2;
            }
        },
    };

    let report = probe(&JfrogCli::new(), &working_dir, minimum).await;
    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            error!("Failed to serialize probe report: {}", e);
            1
        }
    }
}
