/// Errors that can occur in vehicle operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error (peer launch or stream failure).
    #[error("transport error: {0}")]
    Transport(#[from] fcwire_transport::TransportError),

    /// Protocol-level error (timeout or stream failure mid-command).
    #[error("protocol error: {0}")]
    Protocol(#[from] fcwire_protocol::ProtocolError),

    /// The command completed without producing a payload line.
    #[error("{command} returned no payload")]
    EmptyReply { command: &'static str },

    /// The payload did not parse into the expected type.
    #[error("{command} returned malformed payload {payload:?}")]
    MalformedReply {
        command: &'static str,
        payload: String,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;
