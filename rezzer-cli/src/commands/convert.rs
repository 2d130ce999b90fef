// rezzer-cli/src/commands/convert.rs
//
// Logic for the 'convert' subcommand: build the file queue from the
// arguments, configure the batch coordinator, run the batch and report.

use crate::cli::ConvertArgs;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal::TerminalHandler;
use log::{info, warn};
use rezzer_core::events::{JsonEventHandler, LogEventHandler};
use rezzer_core::{
    BatchConfig, BatchCoordinator, BatchSettings, CancellationToken, CoreError, FileQueue,
    ThreadPolicy, check_dependency, parse_drop_list,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Exit status used when a second Ctrl+C forces the process down.
const FORCED_EXIT_CODE: i32 = 130;

/// Builds the queue from positional inputs and the optional drop payload.
pub fn build_queue(args: &ConvertArgs) -> CliResult<FileQueue> {
    let mut queue = FileQueue::new();
    let mut rejected = Vec::new();

    for input in &args.inputs {
        let outcome = if input.is_dir() {
            queue
                .add_directory(input)
                .cli_with_context(|| format!("Failed to read directory {}", input.display()))?
        } else {
            queue.add_paths([input])
        };
        rejected.extend(outcome.rejected);
    }

    if let Some(payload) = &args.drop {
        rejected.extend(queue.add_paths(parse_drop_list(payload)).rejected);
    }

    for rejection in rejected {
        warn!("Skipping {}: {}", rejection.path.display(), rejection.reason);
    }

    Ok(queue)
}

/// Runner options from the arguments.
pub fn batch_config(args: &ConvertArgs) -> BatchConfig {
    BatchConfig {
        encoder_program: args.encoder.clone(),
        max_concurrent_jobs: args.jobs.map(usize::from),
        job_timeout: args.timeout.map(Duration::from_secs),
        overwrite: args.overwrite,
    }
}

/// Runs the convert command. Returns whether every file converted.
pub fn run_convert(args: ConvertArgs) -> CliResult<bool> {
    let queue = build_queue(&args)?;
    let config = batch_config(&args);
    config.validate()?;

    if !queue.is_empty() {
        match check_dependency(&config.encoder_program) {
            Ok(version) => info!("Using encoder: {}", version),
            Err(CoreError::DependencyNotFound(program)) => {
                warn!("Encoder '{}' not found; every file will fail", program)
            }
            Err(e) => warn!("Could not check encoder: {}", e),
        }
    }

    let mut coordinator = BatchCoordinator::new(config);
    coordinator.add_handler(Arc::new(LogEventHandler::new()));
    if args.json {
        coordinator.add_handler(Arc::new(JsonEventHandler::new()));
    } else {
        coordinator.add_handler(Arc::new(TerminalHandler::new(!args.quiet)));
    }

    let settings = BatchSettings::new(
        args.profile,
        ThreadPolicy::from_multithread_flag(!args.single_thread),
    );

    let handle = match coordinator.start(queue.into_paths(), settings) {
        Ok(handle) => handle,
        // The handlers have already shown the "no files" notice.
        Err(CoreError::EmptyBatch) => return Ok(false),
        Err(e) => return Err(e),
    };

    install_interrupt_handler(handle.cancellation_token());

    let report = handle.wait()?;
    info!(
        "Finished: {} succeeded, {} failed",
        report.succeeded, report.failed
    );
    Ok(report.all_succeeded())
}

/// First Ctrl+C cancels the batch; a second one exits immediately.
fn install_interrupt_handler(token: CancellationToken) {
    let interrupted = AtomicBool::new(false);
    let result = ctrlc::set_handler(move || {
        if interrupted.swap(true, Ordering::SeqCst) {
            std::process::exit(FORCED_EXIT_CODE);
        }
        eprintln!("Interrupted, stopping encoders (press Ctrl+C again to force quit)");
        token.cancel();
    });
    if let Err(e) = result {
        warn!("Could not install Ctrl+C handler: {}", e);
    }
}
