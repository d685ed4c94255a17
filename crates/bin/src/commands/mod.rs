//! Subcommand implementations.

pub mod authconfig;
pub mod compile;
pub mod sync;

use fas_client::{Config, HttpDirectoryClient, SyncOptions};
use tracing::info;

use crate::cli::SourceArgs;

/// Apply source overrides and build the account system client.
fn directory_client(
    config: &mut Config,
    source: &SourceArgs,
) -> Result<HttpDirectoryClient, fas_client::Error> {
    if let Some(server) = &source.server {
        config.override_url(server)?;
    }
    let client = HttpDirectoryClient::new(
        &config.global.url,
        &config.global.login,
        config.global.password.clone(),
    )?;
    info!(server = %client.display_url(), "Using account system");
    Ok(client)
}

fn base_options(source: &SourceArgs) -> SyncOptions {
    SyncOptions {
        search: source.search.clone(),
        aliases: source.aliases,
        ..SyncOptions::default()
    }
}
