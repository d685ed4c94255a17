//! Sync command - fetch, compile and install.

use std::process::ExitCode;

use fas_client::{Config, SyncRun, install::Makedb};

use super::{base_options, directory_client};
use crate::cli::SyncArgs;
use crate::output::print_report;

/// Exit status when some artifacts could not be installed.
pub const EXIT_INSTALL_FAILED: u8 = 3;

/// Run the sync command
pub async fn run(args: &SyncArgs, mut config: Config) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = directory_client(&mut config, &args.source)?;
    let encoder = Makedb::new(&config.tools.makedb);
    let options = fas_client::SyncOptions {
        install_group: !args.no_group,
        install_passwd: !args.no_passwd,
        install_shadow: !args.no_shadow,
        ..base_options(&args.source)
    };

    let report = SyncRun::new(&config, &client, &encoder).run(&options).await?;
    print_report(&report, args.format)?;

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_INSTALL_FAILED))
    }
}
