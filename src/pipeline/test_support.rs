use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::context::CleanupContext;
use crate::actions::RecordingPlatform;
use crate::config::CleanupConfig;
use crate::summary::SummaryRenderer;
use crate::tool::{MockCommandRunner, ToolLocator};

pub(crate) fn config_with_servers(servers: &[&str]) -> CleanupConfig {
    let mut config = CleanupConfig::empty();
    config.server_ids = servers.iter().map(|s| s.to_string()).collect();
    config.workspace = Some(PathBuf::from("/repo"));
    config
}

pub(crate) struct FakeLocator(pub Option<PathBuf>);

impl ToolLocator for FakeLocator {
    fn locate(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

pub(crate) fn installed_tool() -> FakeLocator {
    FakeLocator(Some(PathBuf::from("/opt/hostedtoolcache/jf/2.70.0/x64")))
}

/// Summary renderer with canned results that records which methods ran
pub(crate) struct FakeSummary {
    pub supported: bool,
    pub publish: Result<bool, String>,
    pub code_scanning: Result<bool, String>,
    pub clear: Result<(), String>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeSummary {
    pub fn working() -> Self {
        Self {
            supported: true,
            publish: Ok(true),
            code_scanning: Ok(false),
            clear: Ok(()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SummaryRenderer for FakeSummary {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn publish(&self) -> Result<bool> {
        self.calls.lock().unwrap().push("publish");
        self.publish.clone().map_err(|e| anyhow!(e))
    }

    async fn populate_code_scanning(&self) -> Result<bool> {
        self.calls.lock().unwrap().push("populate_code_scanning");
        self.code_scanning.clone().map_err(|e| anyhow!(e))
    }

    async fn clear_artifacts(&self) -> Result<()> {
        self.calls.lock().unwrap().push("clear_artifacts");
        self.clear.clone().map_err(|e| anyhow!(e))
    }
}

/// Renderer that supports summaries and publishes successfully
pub(crate) fn working_summary() -> Arc<FakeSummary> {
    Arc::new(FakeSummary::working())
}

pub(crate) fn context(
    runner: &Arc<MockCommandRunner>,
    platform: &Arc<RecordingPlatform>,
    summary: Arc<FakeSummary>,
    locator: FakeLocator,
    config: CleanupConfig,
) -> CleanupContext {
    CleanupContext::new(
        runner.clone(),
        platform.clone(),
        summary,
        Arc::new(locator),
        config,
    )
}
