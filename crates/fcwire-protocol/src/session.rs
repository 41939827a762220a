use std::collections::VecDeque;
use std::io::{Read, Write};

use fcwire_transport::{LineReader, LineWriter};
use tracing::{debug, trace, warn};

use crate::error::{ProtocolError, Result};
use crate::line::{classify, Line};

/// Default maximum number of inbound lines read per command.
pub const DEFAULT_LINE_BUDGET: usize = 500;

/// Configuration for a protocol session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Maximum inbound lines per command before declaring a timeout.
    pub line_budget: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            line_budget: DEFAULT_LINE_BUDGET,
        }
    }
}

/// One command/response session with the peer.
///
/// Owns the line reader/writer pair, the execution-depth counter, and the
/// notification queue. At most one command is in flight at a time —
/// `send` takes `&mut self` and blocks until the peer's close marker
/// arrives or the line budget runs out.
pub struct Session<R, W> {
    reader: LineReader<R>,
    writer: LineWriter<W>,
    config: SessionConfig,
    /// Unmatched open markers. Persists across commands: the peer is
    /// trusted to balance its markers over the whole session, so a forced
    /// reset per command would only mask desynchronization.
    depth: i64,
    queue: VecDeque<String>,
}

impl<R: Read, W: Write> Session<R, W> {
    /// Create a session with the default configuration.
    pub fn new(read: R, write: W) -> Self {
        Self::with_config(read, write, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(read: R, write: W, config: SessionConfig) -> Self {
        Self {
            reader: LineReader::new(read),
            writer: LineWriter::new(write),
            config,
            depth: 0,
            queue: VecDeque::new(),
        }
    }

    /// Send a command and block until it completes.
    ///
    /// Returns the last payload line the peer printed before its close
    /// marker, or `None` if the command produced no payload. Notifications
    /// received while waiting are queued; they never become the return
    /// value.
    ///
    /// The first close marker terminates the call, whatever the current
    /// depth. Peers that emit a close per nesting level will surface the
    /// innermost result; the depth counter exists to make such streams
    /// diagnosable, not to resynchronize them.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Timeout`] if the line budget is exhausted without a
    /// close marker (the session stays usable), or
    /// [`ProtocolError::Transport`] if the stream fails (fatal).
    pub fn send(&mut self, command: &str) -> Result<Option<String>> {
        debug!(command, "sending command");
        self.writer.write_line(command)?;

        let mut last_payload: Option<String> = None;
        let mut lines_read = 0usize;

        while lines_read < self.config.line_budget {
            let raw = self.reader.read_line()?;
            trace!(n = lines_read, line = %raw, "peer line");

            match classify(&raw) {
                Line::Notification(name) => {
                    trace!(notification = %name, "queued notification");
                    self.queue.push_back(name);
                }
                Line::Open => {
                    self.depth += 1;
                }
                Line::Close => {
                    self.depth -= 1;
                    return Ok(last_payload);
                }
                Line::Payload(text) => {
                    if self.depth != 1 {
                        warn!(depth = self.depth, line = %text, "payload at unexpected execution depth");
                    }
                    last_payload = Some(text);
                }
            }
            lines_read += 1;
        }

        warn!(command, lines_read, "command timed out without completion marker");
        Err(ProtocolError::Timeout { lines_read })
    }

    /// Pop the oldest queued notification, if any.
    pub fn pop_notification(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Number of queued, undispatched notifications.
    pub fn pending_notifications(&self) -> usize {
        self.queue.len()
    }

    /// Current execution depth (unmatched open markers across the session).
    pub fn depth(&self) -> i64 {
        self.depth
    }

    /// Current session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Consume the session and return the reader/writer pair.
    ///
    /// Queued notifications and the depth counter are discarded.
    pub fn into_parts(self) -> (LineReader<R>, LineWriter<W>) {
        (self.reader, self.writer)
    }
}

impl<R, W> std::fmt::Debug for Session<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("depth", &self.depth)
            .field("queued", &self.queue.len())
            .field("line_budget", &self.config.line_budget)
            .finish()
    }
}
