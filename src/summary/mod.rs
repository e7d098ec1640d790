//! Job summary collaborator
//!
//! The CLI renders its own command summaries to markdown under
//! `<JFROG_CLI_COMMAND_SUMMARY_OUTPUT_DIR>/jfrog-command-summary`. This module
//! moves that markdown into the runner's job summary file and uploads the
//! merged SARIF report when one was produced. The intermediate directory is
//! cleared afterwards.

pub mod code_scanning;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::CleanupConfig;

pub use code_scanning::{CodeScanningTarget, CodeScanningUploader};

pub const COMMAND_SUMMARY_DIR_NAME: &str = "jfrog-command-summary";
pub const MARKDOWN_FILE_NAME: &str = "markdown.md";

/// Publishes generated report artifacts as the job's visible summary
#[async_trait]
pub trait SummaryRenderer: Send + Sync {
    /// Whether the runner can display a job summary at all
    fn is_supported(&self) -> bool;

    /// Move the generated markdown into the job summary
    ///
    /// Returns `false` when no markdown was generated.
    async fn publish(&self) -> Result<bool>;

    /// Upload the generated SARIF report to code scanning
    ///
    /// Returns `false` when there is no report to upload.
    async fn populate_code_scanning(&self) -> Result<bool>;

    /// Remove intermediate summary artifacts
    async fn clear_artifacts(&self) -> Result<()>;
}

/// Appends the CLI's markdown to the `GITHUB_STEP_SUMMARY` file
pub struct StepSummaryRenderer {
    step_summary: Option<PathBuf>,
    command_summary_dir: Option<PathBuf>,
    code_scanning: Option<CodeScanningUploader>,
}

impl StepSummaryRenderer {
    pub fn new(step_summary: Option<PathBuf>, command_summary_dir: Option<PathBuf>) -> Self {
        Self {
            step_summary,
            command_summary_dir,
            code_scanning: None,
        }
    }

    pub fn with_code_scanning(mut self, uploader: Option<CodeScanningUploader>) -> Self {
        self.code_scanning = uploader;
        self
    }

    pub fn from_config(config: &CleanupConfig) -> Self {
        Self::new(
            config.step_summary.clone(),
            config.command_summary_dir.clone(),
        )
        .with_code_scanning(CodeScanningUploader::from_env())
    }

    fn summary_root(&self) -> Option<PathBuf> {
        self.command_summary_dir
            .as_ref()
            .map(|dir| dir.join(COMMAND_SUMMARY_DIR_NAME))
    }
}

#[async_trait]
impl SummaryRenderer for StepSummaryRenderer {
    fn is_supported(&self) -> bool {
        self.step_summary.is_some()
    }

    async fn publish(&self) -> Result<bool> {
        let target = self
            .step_summary
            .as_ref()
            .context("GITHUB_STEP_SUMMARY is not set")?;
        let root = self
            .summary_root()
            .context("JFROG_CLI_COMMAND_SUMMARY_OUTPUT_DIR is not set")?;

        let markdown_path = root.join(MARKDOWN_FILE_NAME);
        if !fs::try_exists(&markdown_path).await.unwrap_or(false) {
            debug!(path = %markdown_path.display(), "No summary markdown generated");
            return Ok(false);
        }

        let markdown = fs::read_to_string(&markdown_path)
            .await
            .with_context(|| format!("Failed to read {}", markdown_path.display()))?;
        append(target, &markdown).await?;
        debug!(bytes = markdown.len(), "Job summary written");
        Ok(true)
    }

    async fn populate_code_scanning(&self) -> Result<bool> {
        let Some(root) = self.summary_root() else {
            return Ok(false);
        };
        let report = code_scanning::sarif_report_path(&root);
        if !fs::try_exists(&report).await.unwrap_or(false) {
            debug!(path = %report.display(), "No code scanning SARIF report");
            return Ok(false);
        }

        let sarif = fs::read_to_string(&report)
            .await
            .with_context(|| format!("Failed to read {}", report.display()))?;
        if sarif.trim().is_empty() {
            debug!(path = %report.display(), "SARIF report is empty");
            return Ok(false);
        }

        let uploader = self.code_scanning.as_ref().context(
            "Code scanning upload needs GITHUB_REPOSITORY, GITHUB_SHA and GITHUB_REF",
        )?;
        uploader.upload(&sarif).await?;
        Ok(true)
    }

    async fn clear_artifacts(&self) -> Result<()> {
        let Some(root) = self.summary_root() else {
            return Ok(());
        };
        if !fs::try_exists(&root).await.unwrap_or(false) {
            return Ok(());
        }
        fs::remove_dir_all(&root)
            .await
            .with_context(|| format!("Failed to remove {}", root.display()))
    }
}

async fn append(path: &Path, contents: &str) -> Result<()> {
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(contents.as_bytes()).await?;
    if !contents.ends_with('\n') {
        file.write_all(b"\n").await?;
    }
    file.flush().await?;
    Ok(())
}
