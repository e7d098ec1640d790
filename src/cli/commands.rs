use crate::tool::ToolVersion;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Post-job cleanup for the JFrog CLI in CI runners
#[derive(Parser, Debug)]
#[command(
    name = "postflight",
    about = "Post-job cleanup for the JFrog CLI in CI runners",
    version,
    long_about = "postflight runs after a CI job that used the JFrog CLI. It publishes \
                  pending build info, renders the job summary and always removes the \
                  server configurations the job registered."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the post-job cleanup",
        long_about = "Publishes pending build info and the job summary when enabled, then \
                      removes every configured server. Exits non-zero only when server \
                      removal fails.\n\n\
                      Examples:\n  \
                      postflight cleanup\n  \
                      INPUT_DISABLE-JOB-SUMMARY=true postflight cleanup"
    )]
    Cleanup,

    #[command(
        about = "Report CLI version and unpublished build info as JSON",
        long_about = "Runs the version check and the unpublished-modules dry run once and \
                      prints the result as JSON. Nothing is published or removed.\n\n\
                      Examples:\n  \
                      postflight probe\n  \
                      postflight probe --dir ./service --min-version 2.70.0"
    )]
    Probe(ProbeArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ProbeArgs {
    #[arg(
        long,
        value_name = "PATH",
        help = "Directory to check (defaults to GITHUB_WORKSPACE, then the current directory)"
    )]
    pub dir: Option<PathBuf>,

    #[arg(
        long,
        value_name = "VERSION",
        value_parser = parse_version,
        help = "Minimum CLI version (defaults to POSTFLIGHT_MIN_CLI_VERSION or 2.66.0)"
    )]
    pub min_version: Option<ToolVersion>,
}

fn parse_version(s: &str) -> Result<ToolVersion, String> {
    s.parse().map_err(|e| format!("{}", e))
}
