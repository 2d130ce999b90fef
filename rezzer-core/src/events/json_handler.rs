//! JSON event handler for machine-readable batch output
//!
//! Writes one JSON object per line for every batch event, so wrapper tools
//! can follow a batch without scraping terminal output.

use super::{Event, EventHandler};
use crate::job::JobOutcome;
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Event handler that writes events as JSON lines
pub struct JsonEventHandler {
    output: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventHandler {
    /// Create a handler that writes to stdout
    pub fn new() -> Self {
        Self {
            output: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a handler with a custom writer
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(writer),
        }
    }

    fn get_timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_json(&self, value: serde_json::Value) {
        if let Ok(mut output) = self.output.lock() {
            if let Ok(json_str) = serde_json::to_string(&value) {
                let _ = writeln!(output, "{}", json_str);
                let _ = output.flush();
            }
        }
    }
}

impl Default for JsonEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for JsonEventHandler {
    fn handle(&self, event: &Event) {
        let timestamp = Self::get_timestamp();

        let value = match event {
            Event::BatchStarted {
                total,
                profile,
                threads,
                workers,
            } => json!({
                "type": "batch_started",
                "total": total,
                "profile": profile.index(),
                "profile_name": profile.as_str(),
                "threads": threads,
                "workers": workers,
                "timestamp": timestamp
            }),

            Event::NoFiles => json!({
                "type": "no_files",
                "message": "No files to convert",
                "timestamp": timestamp
            }),

            Event::Log { job, input, line } => json!({
                "type": "log",
                "job": job,
                "input": input.display().to_string(),
                "line": line,
                "timestamp": timestamp
            }),

            Event::JobCompleted {
                job,
                input,
                outcome,
            } => {
                let (status, output, error) = match outcome {
                    JobOutcome::Succeeded(output) => {
                        ("succeeded", Some(output.display().to_string()), None)
                    }
                    JobOutcome::Failed(failure) => ("failed", None, Some(failure.to_string())),
                };
                json!({
                    "type": "job_completed",
                    "job": job,
                    "input": input.display().to_string(),
                    "status": status,
                    "output": output,
                    "error": error,
                    "timestamp": timestamp
                })
            }

            Event::Progress { completed, total } => json!({
                "type": "progress",
                "completed": completed,
                "total": total,
                "timestamp": timestamp
            }),

            Event::BatchComplete(report) => json!({
                "type": "batch_complete",
                "total": report.total,
                "succeeded": report.succeeded,
                "failed": report.failed,
                "elapsed_seconds": report.elapsed.as_secs_f64(),
                "timestamp": timestamp
            }),
        };

        self.write_json(value);
    }
}
