//! Request/response multiplexing over a line-oriented peer stream.
//!
//! The peer speaks a human-readable text protocol on its stdout. Every line
//! it emits is exactly one of:
//! - a structural open marker (the line contains `COMMAND`) — the peer began
//!   executing a command, possibly nested;
//! - a structural close marker (the line starts with `DONE`) — a command
//!   finished; the outstanding `send` completes here;
//! - a notification (`NOTIFY <name>`) — an out-of-band asynchronous event,
//!   queued for later dispatch;
//! - anything else — payload text; the last payload line before the close
//!   marker is the command's return value.
//!
//! [`Session`] owns the state machine, [`Dispatcher`] maps notification
//! names to handlers.

pub mod error;
pub mod line;
pub mod notify;
pub mod session;

pub use error::{ProtocolError, Result};
pub use line::{classify, Line, CLOSE_MARKER, NOTIFY_PREFIX_LEN, OPEN_MARKER};
pub use notify::Dispatcher;
pub use session::{Session, SessionConfig, DEFAULT_LINE_BUDGET};
