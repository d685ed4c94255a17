//! Compile command - write the text artifacts for inspection.

use std::process::ExitCode;

use fas_client::{Config, sync::compile_to_dir};

use super::{base_options, directory_client};
use crate::cli::CompileArgs;

/// Run the compile command
pub async fn run(args: &CompileArgs, mut config: Config) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = directory_client(&mut config, &args.source)?;
    let options = base_options(&args.source);

    let written = compile_to_dir(&config, &client, &options, &args.output).await?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}
