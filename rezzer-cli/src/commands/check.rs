// rezzer-cli/src/commands/check.rs
//
// Logic for the 'check' subcommand: report whether the configured encoder
// can be launched, and which version it is.

use crate::cli::CheckArgs;
use crate::error::CliResult;
use crate::terminal::styling;
use console::style;
use rezzer_core::{CoreError, check_dependency};

/// Runs the check command. Returns whether the encoder was found.
pub fn run_check(args: CheckArgs) -> CliResult<bool> {
    match check_dependency(&args.encoder) {
        Ok(version) => {
            println!(
                "{} {}: {}",
                style(styling::SUCCESS_SYMBOL).green(),
                args.encoder.display(),
                version
            );
            Ok(true)
        }
        Err(CoreError::DependencyNotFound(program)) => {
            println!(
                "{} {}: not found",
                style(styling::ERROR_SYMBOL).red(),
                program
            );
            Ok(false)
        }
        Err(e) => Err(e),
    }
}
