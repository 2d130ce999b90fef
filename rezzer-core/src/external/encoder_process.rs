// ============================================================================
// rezzer-core/src/external/encoder_process.rs
// ============================================================================
//
// ENCODER PROCESS: Spawning and Streaming the Encoder
//
// This module provides the abstraction the job runner drives: something that
// spawns an encoder for an `EncodeCommand`, and a handle to the running
// process that yields merged output lines and can be polled or killed.
//
// KEY COMPONENTS:
// - EncoderSpawner: Trait for launching an encoder process
// - EncoderProcess: Trait representing one running encoder
// - ProcessOutput: Messages produced by the output readers
// - SystemSpawner / SystemProcess: std::process implementation
//
// ARCHITECTURE:
// stdout and stderr are each drained by a dedicated thread. Both threads
// feed one channel, so the consumer sees a single interleaved stream and
// a full pipe can never stall the encoder. The channel disconnects once
// both streams reach EOF.
//
// AI-ASSISTANT-INFO: Encoder process traits and std::process implementation

// ---- Internal crate imports ----
use crate::command::EncodeCommand;

// ---- External crate imports ----
use crossbeam_channel::{Receiver, Sender};

// ---- Standard library imports ----
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

// ============================================================================
// TRAITS
// ============================================================================

/// One message from the encoder's merged output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutput {
    /// A non-empty, trimmed line from stdout or stderr.
    Line(String),
    /// Reading one of the streams failed; that stream is closed.
    ReadError(String),
}

/// A running encoder process.
pub trait EncoderProcess: Send {
    /// Merged output stream. Disconnects when all streams are closed.
    fn output(&self) -> &Receiver<ProcessOutput>;

    /// Non-blocking exit check.
    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>>;

    /// Terminates the process. Killing an already exited process is not an error.
    fn kill(&mut self) -> io::Result<()>;
}

/// Something that can launch an encoder for a command.
pub trait EncoderSpawner: Send + Sync {
    fn spawn(&self, command: &EncodeCommand) -> io::Result<Box<dyn EncoderProcess>>;
}

// ============================================================================
// STD::PROCESS IMPLEMENTATION
// ============================================================================

/// Launches the encoder with `std::process::Command`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpawner;

impl EncoderSpawner for SystemSpawner {
    fn spawn(&self, command: &EncodeCommand) -> io::Result<Box<dyn EncoderProcess>> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let (tx, rx) = crossbeam_channel::unbounded();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader("stdout", stdout, tx.clone())?);
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader("stderr", stderr, tx.clone())?);
        }
        drop(tx);

        log::debug!(
            "Spawned encoder pid {} for {}",
            child.id(),
            command.output_path.display()
        );

        Ok(Box::new(SystemProcess {
            child,
            output: rx,
            readers,
        }))
    }
}

/// A child process plus its output reader threads.
pub struct SystemProcess {
    child: Child,
    output: Receiver<ProcessOutput>,
    readers: Vec<JoinHandle<()>>,
}

impl EncoderProcess for SystemProcess {
    fn output(&self) -> &Receiver<ProcessOutput> {
        &self.output
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            // Readers exit on EOF; joining finished ones keeps the thread count flat.
            let (finished, running): (Vec<_>, Vec<_>) =
                self.readers.drain(..).partition(|handle| handle.is_finished());
            for handle in finished {
                let _ = handle.join();
            }
            self.readers = running;
        }
        Ok(status)
    }

    fn kill(&mut self) -> io::Result<()> {
        match self.child.kill() {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl Drop for SystemProcess {
    fn drop(&mut self) {
        if let Ok(None) = self.child.try_wait() {
            let _ = self.child.kill();
        }
        let _ = self.child.wait();
    }
}

// ============================================================================
// OUTPUT READERS
// ============================================================================

fn spawn_reader<R>(name: &str, stream: R, tx: Sender<ProcessOutput>) -> io::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name(format!("encoder-{}", name))
        .spawn(move || read_lines(stream, &tx))
}

/// Splits `stream` on `\n` and `\r` and forwards each non-empty line.
///
/// ffmpeg redraws its status line with bare carriage returns, so both count
/// as terminators. Returns when the stream ends, fails, or the receiver is gone.
pub(crate) fn read_lines<R: Read>(mut stream: R, tx: &Sender<ProcessOutput>) {
    let mut buf = [0u8; 8192];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let read = match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                let _ = tx.send(ProcessOutput::ReadError(e.to_string()));
                return;
            }
        };

        for &byte in &buf[..read] {
            if byte == b'\n' || byte == b'\r' {
                if !flush_line(&mut pending, tx) {
                    return;
                }
            } else {
                pending.push(byte);
            }
        }
    }

    flush_line(&mut pending, tx);
}

/// Sends the pending bytes as a line. Returns false once the receiver is gone.
fn flush_line(pending: &mut Vec<u8>, tx: &Sender<ProcessOutput>) -> bool {
    let line = String::from_utf8_lossy(pending).trim().to_string();
    pending.clear();
    if line.is_empty() {
        return true;
    }
    tx.send(ProcessOutput::Line(line)).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn collect(input: &[u8]) -> Vec<ProcessOutput> {
        let (tx, rx) = crossbeam_channel::unbounded();
        read_lines(Cursor::new(input.to_vec()), &tx);
        drop(tx);
        rx.iter().collect()
    }

    fn line(s: &str) -> ProcessOutput {
        ProcessOutput::Line(s.to_string())
    }

    #[test]
    fn test_splits_on_newline_and_carriage_return() {
        let out = collect(b"frame=1\rframe=2\r\nDone\n");
        assert_eq!(out, vec![line("frame=1"), line("frame=2"), line("Done")]);
    }

    #[test]
    fn test_skips_blank_lines_and_trims() {
        let out = collect(b"\n\n   \n  padded  \n");
        assert_eq!(out, vec![line("padded")]);
    }

    #[test]
    fn test_flushes_unterminated_tail() {
        let out = collect(b"first\nno newline at end");
        assert_eq!(out, vec![line("first"), line("no newline at end")]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let out = collect(b"bad \xff byte\n");
        assert_eq!(out, vec![line("bad \u{fffd} byte")]);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_read_error_is_forwarded() {
        let (tx, rx) = crossbeam_channel::unbounded();
        read_lines(FailingReader, &tx);
        drop(tx);
        let out: Vec<_> = rx.iter().collect();
        assert_eq!(out, vec![ProcessOutput::ReadError("pipe closed".to_string())]);
    }

    #[cfg(unix)]
    #[test]
    fn test_system_spawner_merges_streams() {
        use std::ffi::OsString;
        use std::path::PathBuf;
        use std::time::Duration;

        let command = EncodeCommand {
            program: PathBuf::from("sh"),
            args: vec![
                OsString::from("-c"),
                OsString::from("echo out; echo err 1>&2; exit 3"),
            ],
            output_path: PathBuf::from("unused.mov"),
        };
        let mut process = SystemSpawner.spawn(&command).unwrap();

        let mut lines: Vec<String> = process
            .output()
            .iter()
            .filter_map(|msg| match msg {
                ProcessOutput::Line(l) => Some(l),
                ProcessOutput::ReadError(_) => None,
            })
            .collect();
        lines.sort();
        assert_eq!(lines, vec!["err".to_string(), "out".to_string()]);

        let status = loop {
            if let Some(status) = process.try_wait().unwrap() {
                break status;
            }
            std::thread::sleep(Duration::from_millis(10));
        };
        assert_eq!(status.code(), Some(3));
    }
}
