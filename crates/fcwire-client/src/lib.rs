//! Typed vehicle commands over the fcwire protocol.
//!
//! This is the "just works" layer. [`Vehicle::launch`] starts the
//! flight-controller bridge and wires its stdin/stdout into a protocol
//! session; the methods on [`Vehicle`] build command lines, block on the
//! reply, and parse the payload into typed results.

pub mod error;
pub mod vehicle;

pub use error::{ClientError, Result};
pub use vehicle::{PeerVehicle, Vehicle};
