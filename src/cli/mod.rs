pub mod commands;
pub mod handlers;

pub use commands::{CliArgs, Commands, ProbeArgs};
pub use handlers::{handle_cleanup, handle_probe, probe, ProbeReport};
