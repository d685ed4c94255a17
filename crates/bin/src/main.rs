//! fas-client: sync account system users and groups onto this host.
//!
//! Usage:
//!   fas-client sync
//!   fas-client --config ./fas.toml compile --output ./out
//!   fas-client enable

use std::process::ExitCode;

use clap::Parser;
use fas_client::Config;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};

/// Exit status for directory fetch or authentication failures.
const EXIT_DIRECTORY: u8 = 1;
/// Exit status when artifacts could not be compiled.
const EXIT_COMPILE: u8 = 2;
/// Exit status for configuration and authconfig failures.
const EXIT_CONFIG: u8 = 5;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "fas_client=debug"
    } else {
        "fas_client=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Map a failed command to the process exit status.
fn exit_code(err: &(dyn std::error::Error + 'static)) -> u8 {
    match err.downcast_ref::<fas_client::Error>() {
        Some(e) if e.is_config_error() => EXIT_CONFIG,
        Some(fas_client::Error::Authconfig(_)) => EXIT_CONFIG,
        Some(e) if e.is_compile_error() => EXIT_COMPILE,
        _ => EXIT_DIRECTORY,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let result = match &cli.command {
        Commands::Sync(args) => commands::sync::run(args, config).await,
        Commands::Compile(args) => commands::compile::run(args, config).await,
        Commands::Enable => commands::authconfig::run(&config, true).await,
        Commands::Disable => commands::authconfig::run(&config, false).await,
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("Error: {err}");
            ExitCode::from(exit_code(err.as_ref()))
        }
    }
}
