// rezzer-cli/src/main.rs
//
// Entry point for the `rezzer` binary.
//
// Responsibilities include:
// - Parsing user-provided arguments.
// - Setting up logging to the console and, optionally, a run log file.
// - Dispatching to the selected subcommand.
// - Mapping results to process exit codes: 0 when everything succeeded,
//   1 when a file failed, nothing was queued, or setup failed.

use clap::Parser;
use log::error;
use rezzer_cli::error::user_message;
use rezzer_cli::logging::init_logging;
use rezzer_cli::{Cli, Commands, run_check, run_convert};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_dir = match &cli.command {
        Commands::Convert(args) => args.log_dir.clone(),
        Commands::Check(_) => None,
    };
    match init_logging(cli.verbose, log_dir.as_deref()) {
        Ok(Some(path)) => log::debug!("Writing run log to {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    }

    let result = match cli.command {
        Commands::Convert(args) => run_convert(args),
        Commands::Check(args) => run_check(args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}
