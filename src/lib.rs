//! postflight - post-job cleanup for the JFrog CLI in CI runners
//!
//! After a job that used the JFrog CLI, postflight publishes any build info
//! the job collected but never published, renders the CLI's command summaries
//! into the job summary and removes the server configurations the job
//! registered. Publishing and summarizing are best effort; server removal
//! always runs and is the only step whose failure fails the job.
//!
//! # Example Usage
//!
//! ```ignore
//! use postflight::{CleanupConfig, CleanupContext, CleanupOrchestrator};
//! use postflight::actions::GithubActions;
//! use postflight::summary::StepSummaryRenderer;
//! use postflight::tool::{JfrogCli, ToolCacheLocator};
//! use std::sync::Arc;
//!
//! async fn post_step() -> i32 {
//!     let config = CleanupConfig::default();
//!     let platform = Arc::new(GithubActions::from_env());
//!     let locator = ToolCacheLocator::new(platform.clone(), config.tool_cache.clone(), &config.cli_version);
//!     let summary = StepSummaryRenderer::from_config(&config);
//!     let context = CleanupContext::new(
//!         Arc::new(JfrogCli::new()),
//!         platform,
//!         Arc::new(summary),
//!         Arc::new(locator),
//!         config,
//!     );
//!     CleanupOrchestrator::new().execute(&context).await.exit_code()
//! }
//! ```
//!
//! # Project Structure
//!
//! - [`pipeline`]: the cleanup phases and their orchestrator
//! - [`tool`]: JFrog CLI invocation, version gate and tool-cache lookup
//! - [`actions`]: CI runner logging, inputs and file commands
//! - [`summary`]: job summary rendering

pub mod actions;
pub mod cli;
pub mod config;
pub mod env_scope;
pub mod pipeline;
pub mod summary;
pub mod tool;
pub mod util;

pub use actions::{GithubActions, Platform, PlatformError, RecordingPlatform};
pub use config::{CleanupConfig, ConfigError, FeatureFlags};
pub use env_scope::{EnvOverride, EnvSnapshot};
pub use pipeline::{
    CleanupContext, CleanupError, CleanupOrchestrator, CleanupReport, PhaseReport, SkipReason,
    WorkflowOutcome,
};
pub use summary::{StepSummaryRenderer, SummaryRenderer};
pub use tool::{CommandError, CommandRunner, JfrogCli, MockCommandRunner, ToolVersion};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
