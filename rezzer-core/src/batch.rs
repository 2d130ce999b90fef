// ============================================================================
// rezzer-core/src/batch.rs
// ============================================================================
//
// BATCH COORDINATOR: Running Many Jobs at Once
//
// A batch is the ordered set of files submitted by one start action. Each
// file becomes one job on a bounded worker pool; every job shares the
// batch's profile and encoder thread count.
//
// KEY COMPONENTS:
// - BatchCoordinator: Owns the runner config, spawner and event handlers
// - BatchHandle: A running batch; cancel it or wait for its report
// - BatchReport / JobSummary: What happened, per job and in total
//
// ARCHITECTURE:
// Workers never touch shared state. They send their job events over a
// channel to a single coordinator thread, which owns the progress counter
// and is the only caller of the event dispatcher. Handlers therefore see a
// serialized stream: log lines from different jobs interleave freely, but
// `Progress` counts strictly 1..=N.
//
// The worker pool is built per batch (never the global rayon pool) and is
// sized to `BatchConfig::max_concurrent_jobs`, defaulting to the number of
// logical processors and never exceeding the batch size.
//
// AI-ASSISTANT-INFO: Batch coordination, worker pool and progress aggregation

// ---- Internal crate imports ----
use crate::cancel::CancellationToken;
use crate::command::output_path_for;
use crate::config::{BatchConfig, BatchSettings, Profile};
use crate::error::{CoreError, CoreResult};
use crate::events::{ChannelHandler, Event, EventDispatcher, EventHandler};
use crate::external::{EncoderSpawner, SystemSpawner};
use crate::job::{Job, JobEvent, JobFailure, JobOutcome, JobRunner};
use crate::queue::absolute_path;

// ---- External crate imports ----
use crossbeam_channel::{Receiver, Sender};
use log::{debug, error, info, warn};
use serde::{Serialize, Serializer};

// ---- Standard library imports ----
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// ============================================================================
// REPORT TYPES
// ============================================================================

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Result of one job within a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub index: usize,
    pub input: PathBuf,
    pub outcome: JobOutcome,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

/// Result of a whole batch. Jobs are listed in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Failed jobs whose failure was cancellation. Included in `failed`.
    pub cancelled: usize,
    pub profile: Profile,
    pub threads: usize,
    #[serde(rename = "elapsed_seconds", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    pub jobs: Vec<JobSummary>,
}

impl BatchReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded == self.total
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobSummary> {
        self.jobs.iter().filter(|job| !job.outcome.is_success())
    }
}

// ============================================================================
// WORKER MESSAGES
// ============================================================================

/// Sent from a worker to the coordinator thread.
enum WorkerMessage {
    Log {
        index: usize,
        line: String,
    },
    Completed {
        index: usize,
        outcome: JobOutcome,
        elapsed: Duration,
    },
}

// ============================================================================
// COORDINATOR
// ============================================================================

/// Starts batches and routes their events to registered handlers.
pub struct BatchCoordinator {
    config: BatchConfig,
    spawner: Arc<dyn EncoderSpawner>,
    dispatcher: EventDispatcher,
}

impl BatchCoordinator {
    /// Coordinator that runs the real encoder.
    pub fn new(config: BatchConfig) -> Self {
        Self::with_spawner(config, Arc::new(SystemSpawner))
    }

    pub fn with_spawner(config: BatchConfig, spawner: Arc<dyn EncoderSpawner>) -> Self {
        Self {
            config,
            spawner,
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.dispatcher.add_handler(handler);
    }

    /// Subscribes to events through a channel.
    pub fn subscribe(&mut self) -> Receiver<Event> {
        let (handler, receiver) = ChannelHandler::new();
        self.dispatcher.add_handler(Arc::new(handler));
        receiver
    }

    /// Starts converting `files` and returns immediately.
    ///
    /// An empty list emits a single [`Event::NoFiles`] and returns
    /// [`CoreError::EmptyBatch`] without dispatching any job. Inputs are made
    /// absolute; a job whose output would overwrite another input of the
    /// batch, or an earlier job's output, fails without being spawned.
    pub fn start(&self, files: Vec<PathBuf>, settings: BatchSettings) -> CoreResult<BatchHandle> {
        if files.is_empty() {
            info!("No files to convert");
            self.dispatcher.emit(Event::NoFiles);
            return Err(CoreError::EmptyBatch);
        }

        self.config.validate()?;

        let files: Vec<PathBuf> = files.iter().map(|file| absolute_path(file)).collect();
        let conflicts = find_output_conflicts(&files);
        let total = files.len();
        let threads = settings.thread_policy.thread_count();
        let workers = self.config.worker_count(total);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("rezzer-job-{}", i))
            .panic_handler(|_| error!("A conversion worker panicked"))
            .build()
            .map_err(|e| CoreError::ThreadPool(e.to_string()))?;

        let cancel = CancellationToken::new();
        let runner = JobRunner::new(self.spawner.clone(), &self.config, cancel.clone());
        let batch = RunningBatch {
            files,
            conflicts,
            settings,
            threads,
            workers,
            dispatcher: self.dispatcher.clone(),
            cancel: cancel.clone(),
        };

        let thread = thread::Builder::new()
            .name("rezzer-batch".to_string())
            .spawn(move || batch.run(pool, runner))?;

        Ok(BatchHandle {
            cancel,
            thread,
            total,
        })
    }

    /// Starts a batch and blocks until it finishes.
    pub fn run(&self, files: Vec<PathBuf>, settings: BatchSettings) -> CoreResult<BatchReport> {
        self.start(files, settings)?.wait()
    }
}

/// A batch in flight.
pub struct BatchHandle {
    cancel: CancellationToken,
    thread: JoinHandle<BatchReport>,
    total: usize,
}

impl BatchHandle {
    pub fn total(&self) -> usize {
        self.total
    }

    /// Kills running encoders and fails every unfinished job as cancelled.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token that cancels this batch, e.g. for a signal handler.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Blocks until every job has completed.
    pub fn wait(self) -> CoreResult<BatchReport> {
        self.thread
            .join()
            .map_err(|_| CoreError::OperationFailed("batch coordinator thread panicked".to_string()))
    }
}

// ============================================================================
// COORDINATOR THREAD
// ============================================================================

struct RunningBatch {
    files: Vec<PathBuf>,
    /// Per job: why it must not run, if its output is already claimed.
    conflicts: Vec<Option<JobFailure>>,
    settings: BatchSettings,
    threads: usize,
    workers: usize,
    dispatcher: EventDispatcher,
    cancel: CancellationToken,
}

impl RunningBatch {
    fn run(self, pool: rayon::ThreadPool, runner: JobRunner) -> BatchReport {
        let total = self.files.len();
        let started = Instant::now();

        self.dispatcher.emit(Event::BatchStarted {
            total,
            profile: self.settings.profile,
            threads: self.threads,
            workers: self.workers,
        });

        let (tx, rx) = crossbeam_channel::unbounded();
        for (index, input) in self.files.iter().enumerate() {
            match &self.conflicts[index] {
                Some(failure) => reject_job(index, input, failure.clone(), &tx),
                None => {
                    let job = Job::new(index, input.clone(), self.settings.profile, self.threads);
                    spawn_job(&pool, runner.clone(), job, tx.clone());
                }
            }
        }
        // The loop below ends once every worker has dropped its sender.
        drop(tx);

        let mut summaries: Vec<Option<JobSummary>> = vec![None; total];
        let mut completed = 0;

        for message in rx.iter() {
            match message {
                WorkerMessage::Log { index, line } => {
                    if self.cancel.is_cancelled() {
                        continue;
                    }
                    self.dispatcher.emit(Event::Log {
                        job: index,
                        input: self.files[index].clone(),
                        line,
                    });
                }
                WorkerMessage::Completed {
                    index,
                    outcome,
                    elapsed,
                } => {
                    if summaries[index].is_some() {
                        error!("Job {} reported completion twice; ignoring", index);
                        continue;
                    }
                    completed += 1;
                    self.complete(&mut summaries, index, outcome, elapsed, completed);
                }
            }
        }

        // A worker that panicked never reported; fail its job so the count still reaches N.
        for index in 0..total {
            if summaries[index].is_none() {
                completed += 1;
                let outcome =
                    JobOutcome::Failed(JobFailure::Io("job did not report completion".to_string()));
                self.complete(&mut summaries, index, outcome, Duration::ZERO, completed);
            }
        }

        let jobs: Vec<JobSummary> = summaries.into_iter().flatten().collect();
        let succeeded = jobs.iter().filter(|job| job.outcome.is_success()).count();
        let cancelled = jobs
            .iter()
            .filter(|job| job.outcome.failure() == Some(&JobFailure::Cancelled))
            .count();

        let report = BatchReport {
            total,
            succeeded,
            failed: total - succeeded,
            cancelled,
            profile: self.settings.profile,
            threads: self.threads,
            elapsed: started.elapsed(),
            jobs,
        };

        debug!(
            "Batch finished: {}/{} succeeded in {:?}",
            report.succeeded, report.total, report.elapsed
        );
        self.dispatcher.emit(Event::BatchComplete(report.clone()));
        report
    }

    fn complete(
        &self,
        summaries: &mut [Option<JobSummary>],
        index: usize,
        outcome: JobOutcome,
        elapsed: Duration,
        completed: usize,
    ) {
        let input = self.files[index].clone();
        self.dispatcher.emit(Event::JobCompleted {
            job: index,
            input: input.clone(),
            outcome: outcome.clone(),
        });
        self.dispatcher.emit(Event::Progress {
            completed,
            total: self.files.len(),
        });
        summaries[index] = Some(JobSummary {
            index,
            input,
            outcome,
            elapsed,
        });
    }
}

/// Checks every job's output path against the batch before anything runs.
///
/// An output may not equal any input of the batch, nor the output of an
/// earlier job. Inputs without a usable file name are left to the runner.
fn find_output_conflicts(files: &[PathBuf]) -> Vec<Option<JobFailure>> {
    let inputs: HashSet<&Path> = files.iter().map(PathBuf::as_path).collect();
    let mut claimed: HashMap<PathBuf, &Path> = HashMap::new();

    files
        .iter()
        .map(|input| {
            let output = output_path_for(input).ok()?;
            if inputs.contains(output.as_path()) {
                return Some(JobFailure::Io(format!(
                    "output {} collides with an input of this batch",
                    output.display()
                )));
            }
            if let Some(owner) = claimed.get(&output) {
                return Some(JobFailure::Io(format!(
                    "output {} collides with the output of {}",
                    output.display(),
                    owner.display()
                )));
            }
            claimed.insert(output, input.as_path());
            None
        })
        .collect()
}

/// Completes a job that was never handed to a worker.
fn reject_job(index: usize, input: &Path, failure: JobFailure, tx: &Sender<WorkerMessage>) {
    warn!("Not converting {}: {}", input.display(), failure);
    let _ = tx.send(WorkerMessage::Log {
        index,
        line: format!("Failed: {}: {}", input.display(), failure),
    });
    let _ = tx.send(WorkerMessage::Completed {
        index,
        outcome: JobOutcome::Failed(failure),
        elapsed: Duration::ZERO,
    });
}

fn spawn_job(pool: &rayon::ThreadPool, runner: JobRunner, mut job: Job, tx: Sender<WorkerMessage>) {
    pool.spawn(move || {
        let index = job.index;
        let started = Instant::now();
        runner.run(&mut job, |event| {
            let message = match event {
                JobEvent::Log(line) => WorkerMessage::Log { index, line },
                JobEvent::Completed(outcome) => WorkerMessage::Completed {
                    index,
                    outcome,
                    elapsed: started.elapsed(),
                },
            };
            // The coordinator outlives every worker, so a send only fails during teardown.
            let _ = tx.send(message);
        });
    });
}
