//! CLI argument definitions for the fas-client binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fas_client::config::DEFAULT_CONFIG_PATH;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Sync account system users and groups into local databases
#[derive(Parser, Debug)]
#[command(name = "fas-client")]
#[command(about = "Sync account system users and groups into local passwd, shadow and group databases")]
#[command(version)]
pub struct Cli {
    /// Config file (falls back to ./fas.toml if missing)
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH, env = "FAS_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and install the most recent account data
    Sync(SyncArgs),
    /// Compile the text artifacts into a directory without installing
    Compile(CompileArgs),
    /// Enable synced shell accounts (USEDB=yes)
    Enable,
    /// Disable synced shell accounts (USEDB=no)
    Disable,
}

/// Where to fetch from
#[derive(clap::Args, Debug)]
pub struct SourceArgs {
    /// Account system URL, overriding the config file
    #[arg(short, long, env = "FAS_URL")]
    pub server: Option<String>,

    /// Search pattern for people and groups
    #[arg(long, default_value = "*")]
    pub search: String,

    /// Also produce the mail alias file and relay recipient map
    #[arg(long)]
    pub aliases: bool,
}

/// Arguments for the sync command
#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Do not install group information
    #[arg(long = "nogroup")]
    pub no_group: bool,

    /// Do not install passwd information
    #[arg(long = "nopasswd")]
    pub no_passwd: bool,

    /// Do not install shadow information
    #[arg(long = "noshadow")]
    pub no_shadow: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for the compile command
#[derive(clap::Args, Debug)]
pub struct CompileArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory to write the text artifacts to
    #[arg(short, long)]
    pub output: PathBuf,
}
