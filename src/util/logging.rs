//! Diagnostic logging for postflight
//!
//! Internal diagnostics go through `tracing` to **stderr**. Stdout is reserved
//! for runner workflow commands written by [`crate::actions::GithubActions`],
//! so the two streams never interleave in a way the runner would misparse.
//!
//! # Example
//!
//! ```no_run
//! use postflight::util::logging::{init_logging, LoggingConfig};
//!
//! // POSTFLIGHT_LOG_LEVEL=debug POSTFLIGHT_LOG_JSON=true
//! init_logging(LoggingConfig::from_env());
//! tracing::debug!(phase = "remove-servers", "Phase started");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVEL_ENV: &str = "POSTFLIGHT_LOG_LEVEL";
pub const LOG_JSON_ENV: &str = "POSTFLIGHT_LOG_JSON";

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for this crate's own events
    pub level: Level,

    /// JSON lines instead of human-readable output
    pub use_json: bool,

    pub include_target: bool,

    /// File and line of each event
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: true,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Level and format from `POSTFLIGHT_LOG_LEVEL` / `POSTFLIGHT_LOG_JSON`
    pub fn from_env() -> Self {
        let level = env::var(LOG_LEVEL_ENV)
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);
        let use_json = env::var(LOG_JSON_ENV)
            .ok()
            .and_then(|v| v.trim().to_lowercase().parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            include_location: use_json,
            ..Default::default()
        }
    }
}

/// Parses a log level, case-insensitively; unknown values fall back to INFO
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// `RUST_LOG` wins when set; otherwise only this crate logs, at `level`
fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }
    EnvFilter::new(format!("warn,postflight={}", level))
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        // try_init: a host process may already own the global subscriber.
        let result = if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging was already initialised: {}", e);
        }
    });
}
