use std::fmt;

use fcwire_client::ClientError;
use fcwire_protocol::ProtocolError;
use fcwire_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const DATA_INVALID: i32 = 60;
#[allow(dead_code)]
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match &err {
        TransportError::Spawn { .. } => FAILURE,
        TransportError::MissingPipe(_) | TransportError::StdioTaken => INTERNAL,
        TransportError::Io(_) | TransportError::Closed => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn protocol_error(context: &str, err: ProtocolError) -> CliError {
    match err {
        ProtocolError::Transport(err) => transport_error(context, err),
        other => CliError::new(TIMEOUT, format!("{context}: {other}")),
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Transport(err) => transport_error(context, err),
        ClientError::Protocol(err) => protocol_error(context, err),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_maps_to_timeout_exit_code() {
        let err = client_error(
            "exec failed",
            ClientError::Protocol(ProtocolError::Timeout { lines_read: 500 }),
        );
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn closed_stream_maps_to_transport_exit_code() {
        let err = client_error("exec failed", ClientError::Transport(TransportError::Closed));
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn malformed_reply_maps_to_data_invalid() {
        let err = client_error(
            "exec failed",
            ClientError::MalformedReply {
                command: "getHeading",
                payload: "???".to_string(),
            },
        );
        assert_eq!(err.code, DATA_INVALID);
    }
}
