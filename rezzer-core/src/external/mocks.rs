// rezzer-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// Compiled for this crate's unit tests only.

use super::{EncoderProcess, EncoderSpawner, ProcessOutput};
use crate::command::EncodeCommand;
use crossbeam_channel::{Receiver, Sender};
use std::io;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(unix)]
fn killed_status() -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    // SIGKILL
    ExitStatus::from_raw(9)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

#[cfg(windows)]
fn killed_status() -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(1)
}

/// How a scripted process finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockExit {
    /// Exits with this code once its lines have been read.
    Code(i32),
    /// Keeps running until killed.
    Hang,
}

/// Scripted stand-in for a running encoder.
pub struct MockProcess {
    output: Receiver<ProcessOutput>,
    // Held open while hanging so the output channel stays connected.
    keep_open: Option<Sender<ProcessOutput>>,
    exit: MockExit,
    killed: bool,
}

impl MockProcess {
    fn new(lines: &[String], read_error: Option<&str>, exit: MockExit) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        for line in lines {
            let _ = tx.send(ProcessOutput::Line(line.clone()));
        }
        if let Some(err) = read_error {
            let _ = tx.send(ProcessOutput::ReadError(err.to_string()));
        }
        let keep_open = match exit {
            MockExit::Hang => Some(tx),
            MockExit::Code(_) => None,
        };
        Self {
            output: rx,
            keep_open,
            exit,
            killed: false,
        }
    }
}

impl EncoderProcess for MockProcess {
    fn output(&self) -> &Receiver<ProcessOutput> {
        &self.output
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        if self.killed {
            return Ok(Some(killed_status()));
        }
        match self.exit {
            MockExit::Code(code) => Ok(Some(exit_status(code))),
            MockExit::Hang => Ok(None),
        }
    }

    fn kill(&mut self) -> io::Result<()> {
        self.killed = true;
        self.keep_open = None;
        Ok(())
    }
}

/// What to do when a spawned command matches a pattern.
#[derive(Debug, Clone)]
enum MockResult {
    Process {
        lines: Vec<String>,
        read_error: Option<String>,
        exit: MockExit,
        create_output: bool,
    },
    SpawnError(io::ErrorKind),
}

#[derive(Debug, Clone)]
struct MockExpectation {
    arg_pattern: String,
    result: MockResult,
}

/// Spawner returning scripted processes.
///
/// Each expectation matches the first spawned command with an argument
/// containing its pattern and is consumed on use. A command matching no
/// expectation fails to spawn with `io::ErrorKind::Other`.
#[derive(Debug, Clone, Default)]
pub struct MockSpawner {
    expectations: Arc<Mutex<Vec<MockExpectation>>>,
    received_calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockSpawner {
    pub fn new() -> Self {
        Default::default()
    }

    fn push(&self, arg_pattern: &str, result: MockResult) {
        if let Ok(mut expectations) = self.expectations.lock() {
            expectations.push(MockExpectation {
                arg_pattern: arg_pattern.to_string(),
                result,
            });
        }
    }

    /// Prints `lines`, writes an empty output file, exits 0.
    pub fn add_success_expectation(&self, arg_pattern: &str, lines: &[&str]) {
        self.push(
            arg_pattern,
            MockResult::Process {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                read_error: None,
                exit: MockExit::Code(0),
                create_output: true,
            },
        );
    }

    pub fn add_exit_error_expectation(&self, arg_pattern: &str, lines: &[&str], exit_code: i32) {
        self.push(
            arg_pattern,
            MockResult::Process {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                read_error: None,
                exit: MockExit::Code(exit_code),
                create_output: false,
            },
        );
    }

    /// Exits 0 after a stream read failure.
    pub fn add_read_error_expectation(&self, arg_pattern: &str, lines: &[&str], error: &str) {
        self.push(
            arg_pattern,
            MockResult::Process {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                read_error: Some(error.to_string()),
                exit: MockExit::Code(0),
                create_output: false,
            },
        );
    }

    /// Prints `lines` then runs until killed.
    pub fn add_hanging_expectation(&self, arg_pattern: &str, lines: &[&str]) {
        self.push(
            arg_pattern,
            MockResult::Process {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                read_error: None,
                exit: MockExit::Hang,
                create_output: false,
            },
        );
    }

    pub fn add_spawn_error_expectation(&self, arg_pattern: &str, kind: io::ErrorKind) {
        self.push(arg_pattern, MockResult::SpawnError(kind));
    }

    pub fn get_received_calls(&self) -> Vec<Vec<String>> {
        self.received_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl EncoderSpawner for MockSpawner {
    fn spawn(&self, command: &EncodeCommand) -> io::Result<Box<dyn EncoderProcess>> {
        let args = command.args_lossy();
        if let Ok(mut calls) = self.received_calls.lock() {
            calls.push(args.clone());
        }

        let expectation = {
            let mut expectations = self
                .expectations
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "mock state poisoned"))?;
            expectations
                .iter()
                .position(|exp| args.iter().any(|arg| arg.contains(&exp.arg_pattern)))
                .map(|index| expectations.remove(index))
        };

        let Some(expectation) = expectation else {
            log::error!("MockSpawner: No expectation found for command args: {:?}", args);
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("no mock expectation for {:?}", args),
            ));
        };

        match expectation.result {
            MockResult::SpawnError(kind) => {
                log::warn!(
                    "MockSpawner simulating spawn error for pattern '{}'",
                    expectation.arg_pattern
                );
                Err(io::Error::new(kind, "simulated spawn failure"))
            }
            MockResult::Process {
                lines,
                read_error,
                exit,
                create_output,
            } => {
                if create_output {
                    if let Err(e) = std::fs::File::create(&command.output_path) {
                        log::error!(
                            "MockSpawner failed to create dummy output file {:?}: {}",
                            command.output_path,
                            e
                        );
                    }
                }
                Ok(Box::new(MockProcess::new(
                    &lines,
                    read_error.as_deref(),
                    exit,
                )))
            }
        }
    }
}
