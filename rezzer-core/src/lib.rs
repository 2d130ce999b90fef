//! Core library for batch conversion of video files to ProRes with ffmpeg.
//!
//! Each input file becomes one job: an ffmpeg process writing
//! `<stem>_prores.mov` next to the input. Jobs run concurrently on a bounded
//! worker pool, their output is streamed live as events, and progress is
//! counted per completed file.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use rezzer_core::{BatchConfig, BatchCoordinator, BatchSettings, FileQueue, Profile, ThreadPolicy};
//! use rezzer_core::events::LogEventHandler;
//! use std::sync::Arc;
//!
//! let mut queue = FileQueue::new();
//! queue.add_paths(["/videos/clip.mp4", "/videos/other clip.mov"]);
//!
//! let mut coordinator = BatchCoordinator::new(BatchConfig::default());
//! coordinator.add_handler(Arc::new(LogEventHandler::new()));
//!
//! let settings = BatchSettings::new(Profile::Standard, ThreadPolicy::Multi);
//! let report = coordinator.run(queue.into_paths(), settings).unwrap();
//! println!("{} of {} converted", report.succeeded, report.total);
//! ```

pub mod batch;
pub mod cancel;
pub mod command;
pub mod config;
pub mod drop_paths;
pub mod error;
pub mod events;
pub mod external;
pub mod job;
pub mod queue;
pub mod utils;

// Re-exports for public API
pub use batch::{BatchCoordinator, BatchHandle, BatchReport, JobSummary};
pub use cancel::CancellationToken;
pub use command::{EncodeCommand, EncodeCommandBuilder, build_command, output_path_for};
pub use config::{BatchConfig, BatchSettings, Profile, ThreadPolicy};
pub use drop_paths::parse_drop_list;
pub use error::{CoreError, CoreResult};
pub use events::{Event, EventDispatcher, EventHandler};
pub use external::check_dependency;
pub use job::{Job, JobEvent, JobFailure, JobOutcome, JobRunner, JobState};
pub use queue::{AddOutcome, FileQueue, RejectReason, Rejection};
pub use utils::{format_bytes, format_duration};
