//! Code scanning upload
//!
//! When the CLI's security commands ran during the job, `generate-summary-markdown`
//! also leaves a merged SARIF report under the command summary directory.
//! That report is sent to the repository's code scanning API so findings show
//! up in the Security tab next to the job summary.

use anyhow::{bail, Context, Result};
use base64::Engine;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::env;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const SARIF_REPORTS_DIR: [&str; 2] = ["security", "sarif-reports"];
pub const FINAL_SARIF_FILE: &str = "final.sarif";

pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";
pub const GITHUB_REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";
pub const GITHUB_SHA_ENV: &str = "GITHUB_SHA";
pub const GITHUB_REF_ENV: &str = "GITHUB_REF";
/// Checked before `GITHUB_TOKEN`
pub const JF_GIT_TOKEN_ENV: &str = "JF_GIT_TOKEN";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

const DEFAULT_API_URL: &str = "https://api.github.com";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// `<command summary root>/security/sarif-reports/final.sarif`
pub fn sarif_report_path(summary_root: &Path) -> PathBuf {
    let mut path = summary_root.to_path_buf();
    path.extend(SARIF_REPORTS_DIR);
    path.join(FINAL_SARIF_FILE)
}

/// Repository and commit the SARIF report is attached to
#[derive(Clone, PartialEq, Eq)]
pub struct CodeScanningTarget {
    pub api_url: String,
    /// `owner/name`
    pub repository: String,
    pub commit_sha: String,
    pub git_ref: String,
    pub token: Option<String>,
}

impl fmt::Debug for CodeScanningTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeScanningTarget")
            .field("api_url", &self.api_url)
            .field("repository", &self.repository)
            .field("commit_sha", &self.commit_sha)
            .field("git_ref", &self.git_ref)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl CodeScanningTarget {
    /// Reads the runner's default variables; `None` outside a repository run
    pub fn from_env() -> Option<Self> {
        Some(Self {
            api_url: var(GITHUB_API_URL_ENV).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            repository: var(GITHUB_REPOSITORY_ENV)?,
            commit_sha: var(GITHUB_SHA_ENV)?,
            git_ref: var(GITHUB_REF_ENV)?,
            token: var(JF_GIT_TOKEN_ENV).or_else(|| var(GITHUB_TOKEN_ENV)),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/repos/{}/code-scanning/sarifs",
            self.api_url.trim_end_matches('/'),
            self.repository
        )
    }
}

#[derive(Serialize)]
struct SarifUpload<'a> {
    commit_sha: &'a str,
    #[serde(rename = "ref")]
    git_ref: &'a str,
    sarif: String,
}

/// Gzip then base64, the encoding the code scanning API expects
pub fn encode_sarif(contents: &str) -> Result<String> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(contents.as_bytes())?;
    let compressed = encoder.finish().context("Failed to compress SARIF report")?;
    Ok(base64::engine::general_purpose::STANDARD.encode(compressed))
}

pub struct CodeScanningUploader {
    http_client: reqwest::Client,
    target: CodeScanningTarget,
}

impl CodeScanningUploader {
    pub fn new(target: CodeScanningTarget) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .user_agent(concat!("postflight/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http_client,
            target,
        }
    }

    pub fn from_env() -> Option<Self> {
        CodeScanningTarget::from_env().map(Self::new)
    }

    pub fn target(&self) -> &CodeScanningTarget {
        &self.target
    }

    pub async fn upload(&self, sarif: &str) -> Result<()> {
        let token = self
            .target
            .token
            .as_deref()
            .context("No GitHub token available (set JF_GIT_TOKEN or GITHUB_TOKEN)")?;

        let body = SarifUpload {
            commit_sha: &self.target.commit_sha,
            git_ref: &self.target.git_ref,
            sarif: encode_sarif(sarif)?,
        };
        let url = self.target.endpoint();
        debug!(%url, sarif_bytes = sarif.len(), "Uploading SARIF report");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .json(&body)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Failed to upload SARIF file: HTTP {}: {}", status, body.trim());
        }
        Ok(())
    }
}
