// ============================================================================
// rezzer-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the Encoder Executable
//
// This module encapsulates everything that touches the encoder process:
// spawning it, streaming its merged output, waiting for and killing it, and
// checking that the executable exists at all.
//
// KEY COMPONENTS:
// - Traits for the encoder process lifecycle (EncoderSpawner, EncoderProcess)
// - SystemSpawner: std::process implementation with one reader thread per stream
// - Dependency checking
// - Scripted mocks for unit tests
//
// AI-ASSISTANT-INFO: Encoder process abstraction and dependency checks

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult, command_start_error};

// ---- Standard library imports ----
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Traits and the std::process implementation for running the encoder
pub mod encoder_process;

/// Scripted spawner used by unit tests
#[cfg(test)]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use encoder_process::{EncoderProcess, EncoderSpawner, ProcessOutput, SystemProcess, SystemSpawner};

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks that the encoder executable can be launched.
///
/// Runs `<program> -version` and returns the first line it prints, or
/// `"unknown version"` when it prints nothing.
///
/// # Errors
///
/// * `CoreError::DependencyNotFound` if the executable does not exist
/// * `CoreError::CommandStart` if it exists but cannot be started
pub fn check_dependency(program: &Path) -> CoreResult<String> {
    let result = Command::new(program)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output();

    match result {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let version = stdout
                .lines()
                .map(str::trim)
                .find(|line| !line.is_empty())
                .unwrap_or("unknown version")
                .to_string();
            log::debug!("Found encoder {}: {}", program.display(), version);
            Ok(version)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Encoder '{}' not found.", program.display());
            Err(CoreError::DependencyNotFound(program.display().to_string()))
        }
        Err(e) => {
            log::error!(
                "Failed to start dependency check command '{}': {}",
                program.display(),
                e
            );
            Err(command_start_error(program.display().to_string(), e))
        }
    }
}
