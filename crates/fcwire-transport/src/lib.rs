//! Transport layer for talking to a flight-controller peer process.
//!
//! Provides two things:
//! - [`PeerProcess`]: launching the peer as a child process with piped
//!   stdin/stdout.
//! - [`LineReader`] / [`LineWriter`]: blocking line-at-a-time I/O over any
//!   `Read`/`Write` stream.
//!
//! This is the lowest layer of fcwire. The protocol state machine builds on
//! the line readers/writers provided here and never touches raw streams.

pub mod error;
pub mod line;
pub mod process;

pub use error::{Result, TransportError};
pub use line::{LineReader, LineWriter};
pub use process::{PeerCommand, PeerProcess, PeerStdio};
