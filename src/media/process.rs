//! Running external tools with line streaming and cancellation.

use crate::constants::tools::{POLL_INTERVAL_MS, STDERR_TAIL_LINES};
use crate::error::{Error, Result};
use crate::pipeline::CancelToken;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace};

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

/// Result of a finished tool run.
#[derive(Debug)]
pub struct ToolOutput {
    /// Exit status of the tool.
    pub status: ExitStatus,
    /// Last lines written to stderr.
    pub stderr_tail: Vec<String>,
}

impl ToolOutput {
    /// Stderr tail joined for error messages.
    pub fn failure_reason(&self) -> String {
        if self.stderr_tail.is_empty() {
            format!("exited with {}", self.status)
        } else {
            format!("exited with {}: {}", self.status, self.stderr_tail.join(" | "))
        }
    }
}

/// Run `command` to completion, handing every output line to `on_line`.
///
/// The child is killed and [`Error::Interrupted`] returned as soon as
/// `cancel` is set. A non-zero exit is not an error here; callers inspect
/// [`ToolOutput::status`].
pub fn run_tool(
    mut command: Command,
    cancel: &CancelToken,
    mut on_line: impl FnMut(Stream, &str),
) -> Result<ToolOutput> {
    let program = command.get_program().to_string_lossy().into_owned();
    debug!("Running {program} {:?}", command.get_args().collect::<Vec<_>>());

    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::ToolNotFound {
            tool: program.clone(),
            source: e,
        },
        _ => Error::Io(e),
    })?;

    let (tx, rx) = mpsc::channel();
    let readers = [
        spawn_reader(child.stdout.take(), Stream::Stdout, tx.clone()),
        spawn_reader(child.stderr.take(), Stream::Stderr, tx),
    ];

    let mut stderr_tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut handle = |stream: Stream, line: String| {
        trace!(target: "tracksplit::tool", "{program}: {line}");
        if stream == Stream::Stderr && !line.trim().is_empty() {
            if stderr_tail.len() == STDERR_TAIL_LINES {
                stderr_tail.pop_front();
            }
            stderr_tail.push_back(line.clone());
        }
        on_line(stream, &line);
    };

    let poll = Duration::from_millis(POLL_INTERVAL_MS);
    let status = loop {
        if cancel.is_cancelled() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Interrupted);
        }

        match rx.recv_timeout(poll) {
            Ok((stream, line)) => {
                handle(stream, line);
                continue;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break child.wait()?,
        }

        if let Some(status) = child.try_wait()? {
            break status;
        }
    };

    // Readers finish at EOF once the child is gone
    for (stream, line) in rx {
        handle(stream, line);
    }
    for reader in readers.into_iter().flatten() {
        let _ = reader.join();
    }

    Ok(ToolOutput {
        status,
        stderr_tail: stderr_tail.into(),
    })
}

fn spawn_reader<R>(
    pipe: Option<R>,
    stream: Stream,
    tx: Sender<(Stream, String)>,
) -> Option<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    let pipe = pipe?;
    Some(thread::spawn(move || {
        let mut reader = BufReader::new(pipe);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf)
                        .trim_end_matches(['\r', '\n'])
                        .to_string();
                    if tx.send((stream, line)).is_err() {
                        break;
                    }
                }
            }
        }
    }))
}
