use postflight::cli::commands::{CliArgs, Commands};
use postflight::cli::handlers::{handle_cleanup, handle_probe};
use postflight::util::logging::{init_logging, parse_level, LoggingConfig};
use postflight::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("postflight v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Cleanup => handle_cleanup().await,
        Commands::Probe(probe_args) => handle_probe(probe_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();
    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }
    init_logging(config);
}
