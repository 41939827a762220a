//! Line-oriented wire interface to a flight-controller peer process.
//!
//! fcwire multiplexes synchronous command/reply cycles and asynchronous
//! notifications over a single line-delimited stream to a long-running
//! peer process.
//!
//! # Crate Structure
//!
//! - [`transport`] — Peer-process launch and line-level stream I/O
//! - [`protocol`] — Line classification, the send/receive state machine,
//!   notification queueing and dispatch
//! - [`client`] — Typed vehicle facade over the protocol

/// Re-export transport types.
pub mod transport {
    pub use fcwire_transport::*;
}

/// Re-export protocol types.
pub mod protocol {
    pub use fcwire_protocol::*;
}

/// Re-export client types.
pub mod client {
    pub use fcwire_client::*;
}
