use crate::actions::{LogGroup, Platform};
use crate::tool::{CommandRunner, RunOptions};

pub const PING_ARGS: [&str; 2] = ["rt", "ping"];

/// Ping the configured server; only an exact `OK` counts as reachable
pub async fn check_connection(runner: &dyn CommandRunner, platform: &dyn Platform) -> bool {
    let _group = LogGroup::start(platform, "Checking connection to JFrog Artifactory");
    match runner.run(&PING_ARGS, &RunOptions::silent()).await {
        Ok(output) if output.trim() == "OK" => true,
        Ok(output) => {
            platform.debug(&format!("Ping result: {}", output));
            platform.warning("Could not connect to Artifactory. Skipping Build Info post tasks.");
            false
        }
        Err(e) => {
            platform.warning(&format!(
                "An error occurred while trying to connect to Artifactory: {}. Skipping Build Info post tasks.",
                e
            ));
            false
        }
    }
}
