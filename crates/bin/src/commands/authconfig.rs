//! Enable and disable commands - flip USEDB in the authconfig file.

use std::process::ExitCode;

use fas_client::{Config, authconfig::toggle_usedb};

/// Run the enable or disable command
pub async fn run(config: &Config, enabled: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    toggle_usedb(&config.paths.authconfig, enabled, &config.tools.authconfig)
        .await
        .map_err(fas_client::Error::from)?;
    println!(
        "Synced shell accounts {}",
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(ExitCode::SUCCESS)
}
