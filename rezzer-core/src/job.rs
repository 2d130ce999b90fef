// ============================================================================
// rezzer-core/src/job.rs
// ============================================================================
//
// JOB RUNNER: Converting a Single File
//
// A job is one input file converted to one ProRes output. The runner builds
// the encoder command, spawns it, forwards every output line as it arrives,
// and reports exactly one completion whatever happens. Failures are values
// (`JobFailure`), never errors or panics, so one bad file cannot take its
// siblings down.
//
// KEY COMPONENTS:
// - Job / JobState: One file's conversion task and its lifecycle
// - JobOutcome / JobFailure: Terminal result of a job
// - JobEvent: What the runner reports while working
// - JobRunner: Drives an EncoderProcess to completion
//
// AI-ASSISTANT-INFO: Per-file conversion job execution

// ---- Internal crate imports ----
use crate::cancel::CancellationToken;
use crate::command::{EncodeCommand, EncodeCommandBuilder};
use crate::config::{BatchConfig, Profile};
use crate::external::{EncoderProcess, EncoderSpawner, ProcessOutput};

// ---- External crate imports ----
use crossbeam_channel::RecvTimeoutError;
use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

// ---- Standard library imports ----
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often the runner wakes up to check exit, timeout and cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to keep reading output after the encoder has exited.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

// ============================================================================
// JOB TYPES
// ============================================================================

/// Lifecycle of a job: `Pending -> Running -> Succeeded | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// Why a job failed.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum JobFailure {
    #[error("encoder '{0}' not found")]
    ProcessNotFound(String),

    /// Exit code `-1` means the encoder was terminated by a signal.
    #[error("encoder exited with code {0}")]
    NonZeroExit(i32),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("cancelled")]
    Cancelled,
}

/// Terminal result of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum JobOutcome {
    Succeeded(PathBuf),
    Failed(JobFailure),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded(_))
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        match self {
            JobOutcome::Succeeded(_) => None,
            JobOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Reported by the runner while a job executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    Log(String),
    /// Sent exactly once, last.
    Completed(JobOutcome),
}

/// One file's conversion task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub index: usize,
    pub input: PathBuf,
    pub profile: Profile,
    pub threads: usize,
    state: JobState,
}

impl Job {
    pub fn new(index: usize, input: impl Into<PathBuf>, profile: Profile, threads: usize) -> Self {
        Self {
            index,
            input: input.into(),
            profile,
            threads,
            state: JobState::Pending,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Where the converted file is written, if the input has a usable name.
    pub fn output_path(&self) -> Option<PathBuf> {
        crate::command::output_path_for(&self.input).ok()
    }
}

// ============================================================================
// JOB RUNNER
// ============================================================================

/// Runs jobs against an encoder spawner. Cheap to clone; clones share the
/// spawner and cancellation token.
#[derive(Clone)]
pub struct JobRunner {
    spawner: Arc<dyn EncoderSpawner>,
    encoder_program: PathBuf,
    overwrite: bool,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl JobRunner {
    pub fn new(
        spawner: Arc<dyn EncoderSpawner>,
        config: &BatchConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            spawner,
            encoder_program: config.encoder_program.clone(),
            overwrite: config.overwrite,
            timeout: config.job_timeout,
            cancel,
        }
    }

    /// Runs `job` to completion, reporting through `sink`.
    ///
    /// `sink` receives every log line as it is produced and then exactly one
    /// [`JobEvent::Completed`]. Once the job is cancelled no further log
    /// lines are sent.
    pub fn run<F>(&self, job: &mut Job, mut sink: F) -> JobOutcome
    where
        F: FnMut(JobEvent),
    {
        let outcome = match self.execute(job, &mut sink) {
            Ok(output) => {
                info!("Converted {} -> {}", job.input.display(), output.display());
                sink(JobEvent::Log(format!("Finished: {}", output.display())));
                JobOutcome::Succeeded(output)
            }
            Err(JobFailure::Cancelled) => {
                debug!("Job {} cancelled: {}", job.index, job.input.display());
                JobOutcome::Failed(JobFailure::Cancelled)
            }
            Err(failure) => {
                warn!("Failed to convert {}: {}", job.input.display(), failure);
                sink(JobEvent::Log(format!(
                    "Failed: {}: {}",
                    job.input.display(),
                    failure
                )));
                JobOutcome::Failed(failure)
            }
        };

        job.state = if outcome.is_success() {
            JobState::Succeeded
        } else {
            JobState::Failed
        };
        sink(JobEvent::Completed(outcome.clone()));
        outcome
    }

    fn execute<F>(&self, job: &mut Job, sink: &mut F) -> Result<PathBuf, JobFailure>
    where
        F: FnMut(JobEvent),
    {
        if self.cancel.is_cancelled() {
            return Err(JobFailure::Cancelled);
        }

        if !job.input.is_file() {
            return Err(JobFailure::Io(format!(
                "input file not found: {}",
                job.input.display()
            )));
        }

        let command = self.build_command(job)?;

        sink(JobEvent::Log(format!("Converting: {}", job.input.display())));
        sink(JobEvent::Log(format!("Command: {}", command.display())));
        debug!("Running encoder: {}", command.display());

        let mut process = self.spawner.spawn(&command).map_err(|e| self.spawn_failure(e))?;
        job.state = JobState::Running;

        let status = self.supervise(process.as_mut(), sink)?;
        if !status.success() {
            return Err(JobFailure::NonZeroExit(status.code().unwrap_or(-1)));
        }

        Ok(command.output_path)
    }

    fn build_command(&self, job: &Job) -> Result<EncodeCommand, JobFailure> {
        EncodeCommandBuilder::new(&job.input)
            .program(&self.encoder_program)
            .profile(job.profile)
            .threads(job.threads)
            .overwrite(self.overwrite)
            .build()
            .map_err(|e| JobFailure::Io(e.to_string()))
    }

    fn spawn_failure(&self, error: io::Error) -> JobFailure {
        if error.kind() == io::ErrorKind::NotFound {
            JobFailure::ProcessNotFound(self.encoder_program.display().to_string())
        } else {
            JobFailure::Io(format!("failed to start encoder: {}", error))
        }
    }

    /// Streams output until the process exits and its output is drained.
    fn supervise<F>(
        &self,
        process: &mut dyn EncoderProcess,
        sink: &mut F,
    ) -> Result<ExitStatus, JobFailure>
    where
        F: FnMut(JobEvent),
    {
        let deadline = self.timeout.map(|limit| Instant::now() + limit);
        let mut read_error: Option<String> = None;
        let mut exit_status: Option<ExitStatus> = None;
        let mut drain_until: Option<Instant> = None;

        loop {
            self.check_interrupts(process, deadline)?;
            if drain_until.is_some_and(|until| Instant::now() >= until) {
                break;
            }

            match process.output().recv_timeout(POLL_INTERVAL) {
                Ok(ProcessOutput::Line(line)) => sink(JobEvent::Log(line)),
                Ok(ProcessOutput::ReadError(e)) => {
                    read_error.get_or_insert(e);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if exit_status.is_none() {
                        exit_status = process.try_wait().map_err(wait_failure)?;
                        if exit_status.is_some() {
                            drain_until = Some(Instant::now() + DRAIN_GRACE);
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        let status = match exit_status {
            Some(status) => status,
            None => self.wait_for_exit(process, deadline)?,
        };

        if status.success() {
            if let Some(e) = read_error {
                return Err(JobFailure::Io(format!(
                    "failed to read encoder output: {}",
                    e
                )));
            }
        }
        Ok(status)
    }

    fn wait_for_exit(
        &self,
        process: &mut dyn EncoderProcess,
        deadline: Option<Instant>,
    ) -> Result<ExitStatus, JobFailure> {
        loop {
            self.check_interrupts(process, deadline)?;
            if let Some(status) = process.try_wait().map_err(wait_failure)? {
                return Ok(status);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Kills the process if the batch was cancelled or the deadline passed.
    fn check_interrupts(
        &self,
        process: &mut dyn EncoderProcess,
        deadline: Option<Instant>,
    ) -> Result<(), JobFailure> {
        if self.cancel.is_cancelled() {
            kill_quietly(process);
            return Err(JobFailure::Cancelled);
        }
        if let (Some(deadline), Some(limit)) = (deadline, self.timeout) {
            if Instant::now() >= deadline {
                kill_quietly(process);
                return Err(JobFailure::TimedOut(limit));
            }
        }
        Ok(())
    }
}

fn wait_failure(error: io::Error) -> JobFailure {
    JobFailure::Io(format!("failed to wait for encoder: {}", error))
}

fn kill_quietly(process: &mut dyn EncoderProcess) {
    if let Err(e) = process.kill() {
        warn!("Failed to kill encoder process: {}", e);
    }
}

/// File name of `path` for display, falling back to the full path.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
