use super::{Event, EventHandler};
use crate::job::{JobOutcome, display_name};
use crate::utils::format_duration;
use log::{debug, info, warn};

/// Mirrors batch events into the `log` facade.
///
/// Encoder output goes to `debug` so a run log file keeps it without
/// flooding the console at the default level.
#[derive(Debug, Default)]
pub struct LogEventHandler;

impl LogEventHandler {
    pub fn new() -> Self {
        Self
    }
}

impl EventHandler for LogEventHandler {
    fn handle(&self, event: &Event) {
        match event {
            Event::BatchStarted {
                total,
                profile,
                threads,
                workers,
            } => {
                info!(
                    "Starting batch: {} file(s), profile {}, {} encoder thread(s), {} concurrent job(s)",
                    total,
                    profile.label(),
                    threads,
                    workers
                );
            }

            Event::NoFiles => {
                warn!("No files to convert");
            }

            Event::Log { input, line, .. } => {
                debug!("[{}] {}", display_name(input), line);
            }

            Event::JobCompleted { input, outcome, .. } => match outcome {
                JobOutcome::Succeeded(output) => {
                    info!("Done: {} -> {}", display_name(input), output.display());
                }
                JobOutcome::Failed(failure) => {
                    warn!("Failed: {} ({})", display_name(input), failure);
                }
            },

            Event::Progress { completed, total } => {
                debug!("Progress: {}/{}", completed, total);
            }

            Event::BatchComplete(report) => {
                info!(
                    "Batch complete: {} succeeded, {} failed, {} total in {}",
                    report.succeeded,
                    report.failed,
                    report.total,
                    format_duration(report.elapsed)
                );
            }
        }
    }
}
