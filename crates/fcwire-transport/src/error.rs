use std::path::PathBuf;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to launch the peer process.
    #[error("failed to spawn peer {program}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    /// The peer process was spawned without the expected pipe.
    #[error("peer process has no piped {0}")]
    MissingPipe(&'static str),

    /// The peer's stdio pipes were already taken from this handle.
    #[error("peer stdio already taken")]
    StdioTaken,

    /// An I/O error occurred on the stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream reached EOF — the peer closed its end or exited.
    #[error("peer stream closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
