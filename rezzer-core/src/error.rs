// ============================================================================
// rezzer-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for Rezzer Core
//
// This module defines the error types used at the library boundary. Errors
// that concern a single file never surface here: they are reported as a
// failed job outcome (see `job::JobFailure`) so sibling jobs keep running.
// `CoreError` covers everything that stops a batch from starting at all.
//
// KEY COMPONENTS:
// - CoreError: Enum of batch-level error conditions
// - CoreResult: Type alias for Result with CoreError
// - Helper functions for building command start errors
//
// AI-ASSISTANT-INFO: Error handling for rezzer-core, batch-level errors only

// ---- External crate imports ----
use thiserror::Error;

// ---- Standard library imports ----
use std::io;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Batch-level errors returned by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A batch was started with no files in it.
    #[error("No files to convert")]
    EmptyBatch,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The encoder executable could not be found.
    #[error("Required external command '{0}' not found")]
    DependencyNotFound(String),

    #[error("Failed to start command '{command}': {source}")]
    CommandStart {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type used throughout rezzer-core.
pub type CoreResult<T> = Result<T, CoreError>;

// ============================================================================
// ERROR HELPERS
// ============================================================================

/// Builds a [`CoreError::CommandStart`] for the given command.
pub fn command_start_error(command: impl Into<String>, source: io::Error) -> CoreError {
    CoreError::CommandStart {
        command: command.into(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_message() {
        assert_eq!(CoreError::EmptyBatch.to_string(), "No files to convert");
    }

    #[test]
    fn test_command_start_error_keeps_command_name() {
        let err = command_start_error(
            "ffmpeg",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("ffmpeg"));
        assert!(message.contains("denied"));
    }

    #[test]
    fn test_io_error_converts() {
        let err: CoreError = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(matches!(err, CoreError::Io(_)));
    }
}
