/// Errors that can occur while multiplexing commands over the peer stream.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Transport-level error. Fatal to the session: the peer stream is gone.
    #[error("transport error: {0}")]
    Transport(#[from] fcwire_transport::TransportError),

    /// The line budget was exhausted without a completion marker.
    ///
    /// Not fatal: the session remains usable for subsequent commands.
    #[error("command timed out after {lines_read} lines read")]
    Timeout { lines_read: usize },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
