// rezzer-cli/src/error.rs
//
// Error plumbing between the core library and the terminal: a context
// helper for setup steps, and the text shown for an error that reaches main.

use rezzer_core::CoreError;
use rezzer_core::config::ENCODER_ENV_VAR;
use std::fmt;

/// CLI operations fail with the core error type.
pub type CliResult<T> = Result<T, CoreError>;

/// Prefixes a failed setup step's error with what was being attempted.
pub trait CliErrorContext<T> {
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T, E> CliErrorContext<T> for Result<T, E>
where
    E: Into<CoreError>,
{
    fn cli_with_context<C, F>(self, f: F) -> CliResult<T>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let cause: CoreError = e.into();
            CoreError::OperationFailed(format!("{}: {}", f(), cause))
        })
    }
}

/// Message printed for an error that ends the run, with a hint where the
/// user can act on it.
pub fn user_message(error: &CoreError) -> String {
    match error {
        CoreError::EmptyBatch => "No files to convert. Pass files or directories to convert.".to_string(),
        CoreError::Config(detail) => config_message(detail),
        CoreError::DependencyNotFound(program) => format!(
            "Encoder '{}' not found. Install ffmpeg, or point --encoder or {} at it.",
            program, ENCODER_ENV_VAR
        ),
        CoreError::CommandStart { command, source } => {
            format!("Could not start '{}': {}", command, source)
        }
        other => other.to_string(),
    }
}

/// Config field names and the options that set them.
const CONFIG_FLAGS: [(&str, &str); 3] = [
    ("encoder_program", "--encoder"),
    ("max_concurrent_jobs", "--jobs"),
    ("job_timeout", "--timeout"),
];

/// Rewrites a config error in terms of the option the user passed.
fn config_message(detail: &str) -> String {
    for (field, flag) in CONFIG_FLAGS {
        if let Some(rest) = detail.strip_prefix(field) {
            return format!("Invalid {}:{}", flag, rest);
        }
    }
    format!("Invalid configuration: {}", detail)
}
