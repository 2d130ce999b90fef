// ============================================================================
// rezzer-cli/src/terminal.rs
// ============================================================================
//
// TERMINAL OUTPUT: Progress Display for a Running Batch
//
// Renders batch events for a person watching the terminal: a progress bar
// counting finished files on stderr, encoder output and per-file results
// on stdout above it, and a summary once the batch completes.
//
// KEY COMPONENTS:
// - styling: Symbols and progress bar layout
// - TerminalHandler: EventHandler driving the progress bar
//
// AI-ASSISTANT-INFO: Terminal progress display for batch events

// ---- Internal crate imports ----
use rezzer_core::events::{Event, EventHandler};
use rezzer_core::job::display_name;
use rezzer_core::{BatchReport, JobOutcome, format_bytes, format_duration};

// ---- External crate imports ----
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

// ---- Standard library imports ----
use std::fs;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// STYLING CONSTANTS
// ============================================================================

pub mod styling {
    pub const SUCCESS_SYMBOL: &str = "✓";
    pub const ERROR_SYMBOL: &str = "✗";
    pub const PROCESSING_SYMBOL: &str = "»";

    pub const PROGRESS_TEMPLATE: &str =
        "  Converting: {pos}/{len} files [{bar:30}] {elapsed_precise} {spinner}";
    pub const PROGRESS_CHARS: &str = "##.";
}

// ============================================================================
// TERMINAL HANDLER
// ============================================================================

/// Shows batch progress in the terminal.
pub struct TerminalHandler {
    progress_bar: Mutex<Option<ProgressBar>>,
    show_encoder_output: bool,
}

impl TerminalHandler {
    pub fn new(show_encoder_output: bool) -> Self {
        Self {
            progress_bar: Mutex::new(None),
            show_encoder_output,
        }
    }

    /// Prints above the progress bar, or plainly when there is none.
    fn print_line(&self, line: &str) {
        match self.progress_bar.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(pb) => pb.suspend(|| println!("{}", line)),
                None => println!("{}", line),
            },
            Err(_) => println!("{}", line),
        }
    }

    fn start_progress(&self, total: usize) {
        let pb = ProgressBar::new(total as u64);
        if let Ok(progress_style) = ProgressStyle::default_bar().template(styling::PROGRESS_TEMPLATE) {
            pb.set_style(progress_style.progress_chars(styling::PROGRESS_CHARS));
        }
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut guard) = self.progress_bar.lock() {
            *guard = Some(pb);
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress_bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn print_summary(&self, report: &BatchReport) {
        let output_bytes: u64 = report
            .jobs
            .iter()
            .filter_map(|job| match &job.outcome {
                JobOutcome::Succeeded(output) => fs::metadata(output).ok().map(|m| m.len()),
                JobOutcome::Failed(_) => None,
            })
            .sum();

        println!();
        println!(
            "{} Converted {} of {} file(s) in {} ({} written)",
            style(styling::PROCESSING_SYMBOL).bold(),
            report.succeeded,
            report.total,
            format_duration(report.elapsed),
            format_bytes(output_bytes)
        );

        for job in report.failures() {
            if let JobOutcome::Failed(failure) = &job.outcome {
                println!(
                    "  {} {}: {}",
                    style(styling::ERROR_SYMBOL).red(),
                    display_name(&job.input),
                    failure
                );
            }
        }
    }
}

impl EventHandler for TerminalHandler {
    fn handle(&self, event: &Event) {
        match event {
            Event::BatchStarted {
                total,
                profile,
                threads,
                workers,
            } => {
                println!(
                    "{} {} file(s), profile {}, {} encoder thread(s), {} at a time",
                    style(styling::PROCESSING_SYMBOL).bold(),
                    total,
                    style(profile.label()).bold(),
                    threads,
                    workers
                );
                self.start_progress(*total);
            }

            Event::NoFiles => {
                println!("{}", style("No files to convert").yellow().bold());
            }

            Event::Log { input, line, .. } => {
                if self.show_encoder_output {
                    self.print_line(&format!("{} {}", style(format!("[{}]", display_name(input))).dim(), line));
                }
            }

            Event::JobCompleted { input, outcome, .. } => {
                let line = match outcome {
                    JobOutcome::Succeeded(output) => format!(
                        "{} {} -> {}",
                        style(styling::SUCCESS_SYMBOL).green(),
                        display_name(input),
                        output.display()
                    ),
                    JobOutcome::Failed(failure) => format!(
                        "{} {}: {}",
                        style(styling::ERROR_SYMBOL).red(),
                        display_name(input),
                        style(failure).red()
                    ),
                };
                self.print_line(&line);
            }

            Event::Progress { completed, .. } => {
                if let Ok(guard) = self.progress_bar.lock() {
                    if let Some(pb) = guard.as_ref() {
                        pb.set_position(*completed as u64);
                    }
                }
            }

            Event::BatchComplete(report) => {
                self.finish_progress();
                self.print_summary(report);
            }
        }
    }
}
