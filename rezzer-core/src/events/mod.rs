//! Events emitted while a batch runs, and the handlers that consume them.
//!
//! The batch coordinator owns one [`EventDispatcher`] and is the only thread
//! that calls it, so handlers see events one at a time in emission order.

use crate::batch::BatchReport;
use crate::config::Profile;
use crate::job::JobOutcome;
use crossbeam_channel::{Receiver, Sender};
use std::path::PathBuf;
use std::sync::Arc;

pub mod json_handler;
pub mod log_handler;

pub use json_handler::JsonEventHandler;
pub use log_handler::LogEventHandler;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Emitted once, before any job runs.
    BatchStarted {
        total: usize,
        profile: Profile,
        threads: usize,
        workers: usize,
    },

    /// A batch was started with nothing in it. No other event follows.
    NoFiles,

    /// One line of output from a job, including its start and command lines.
    Log {
        job: usize,
        input: PathBuf,
        line: String,
    },

    JobCompleted {
        job: usize,
        input: PathBuf,
        outcome: JobOutcome,
    },

    /// Follows every `JobCompleted`. `completed` runs from 1 to `total`.
    Progress {
        completed: usize,
        total: usize,
    },

    BatchComplete(BatchReport),
}

pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event);
}

#[derive(Clone)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn emit(&self, event: Event) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards events into a channel for consumers that poll.
pub struct ChannelHandler {
    sender: Sender<Event>,
}

impl ChannelHandler {
    /// Creates a handler and the receiving end of its channel.
    pub fn new() -> (Self, Receiver<Event>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl EventHandler for ChannelHandler {
    fn handle(&self, event: &Event) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.sender.send(event.clone());
    }
}
