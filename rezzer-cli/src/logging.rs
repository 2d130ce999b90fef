// ============================================================================
// rezzer-cli/src/logging.rs
// ============================================================================
//
// LOGGING: Console and Run Log Setup
//
// Configures the `log` facade with fern. Console output goes to stderr; the
// core library's own records are kept off the console unless --verbose is
// given, because the terminal handler already renders the same information
// around the progress bar. A run log file, when requested, receives every
// record at debug level, including encoder output.
//
// KEY COMPONENTS:
// - init_logging: Installs the global logger
// - get_timestamp: Timestamp used in run log file names
//
// AI-ASSISTANT-INFO: fern logging setup for the CLI

// ---- External crate imports ----
use log::LevelFilter;

// ---- Standard library imports ----
use std::fs;
use std::path::{Path, PathBuf};

// ---- Internal crate imports ----
use crate::error::{CliErrorContext, CliResult};

/// Returns the current local timestamp formatted as "YYYYMMDD_HHMMSS".
///
/// # Example
/// ```
/// let log_filename = format!("rezzer_run_{}.log", rezzer_cli::logging::get_timestamp());
/// assert!(log_filename.starts_with("rezzer_run_"));
/// ```
pub fn get_timestamp() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Installs the global logger.
///
/// Returns the path of the run log file when `log_dir` is given.
pub fn init_logging(verbose: bool, log_dir: Option<&Path>) -> CliResult<Option<PathBuf>> {
    let console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let core_console_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Off
    };

    let console = fern::Dispatch::new()
        .level(console_level)
        .level_for("rezzer_core", core_console_level)
        .format(|out, message, record| {
            let level = match record.level() {
                log::Level::Error => console::style("error").red().bold(),
                log::Level::Warn => console::style("warning").yellow().bold(),
                log::Level::Info => console::style("info").cyan(),
                log::Level::Debug => console::style("debug").dim(),
                log::Level::Trace => console::style("trace").dim(),
            };
            out.finish(format_args!("{}: {}", level, message))
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new().chain(console);

    let log_path = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .cli_with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let path = dir.join(format!("rezzer_run_{}.log", get_timestamp()));
            let file = fern::log_file(&path)
                .cli_with_context(|| format!("Failed to open log file {}", path.display()))?;

            let file_dispatch = fern::Dispatch::new()
                .level(LevelFilter::Debug)
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        record.level(),
                        message
                    ))
                })
                .chain(file);
            dispatch = dispatch.chain(file_dispatch);
            Some(path)
        }
        None => None,
    };

    dispatch
        .apply()
        .map_err(|e| rezzer_core::CoreError::OperationFailed(format!("Failed to initialize logging: {}", e)))?;

    Ok(log_path)
}
