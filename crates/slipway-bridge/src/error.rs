use std::io;
use std::net::SocketAddr;

/// Errors produced by the bridge engine.
///
/// Serial-channel failures are fatal to the session; everything else is
/// local to the call that raised it. UDP receive/send faults never appear
/// here at all; they are logged and the loops continue.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Failed to bind the local UDP socket.
    #[error("failed to bind UDP socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: io::Error,
    },

    /// The serial channel could not be opened.
    #[error("failed to open serial channel {name}: {source}")]
    SerialOpen {
        name: String,
        source: io::Error,
    },

    /// `open` was called while a serial channel is already open.
    #[error("serial channel already open")]
    SerialAlreadyOpen,

    /// A serial read failed. Fatal to the session.
    #[error("serial read failed: {0}")]
    SerialRead(io::Error),

    /// A serial write failed. Fatal to the session.
    #[error("serial write failed: {0}")]
    SerialWrite(io::Error),

    /// The serial channel reported end-of-stream. Fatal to the session.
    #[error("serial channel disconnected")]
    SerialDisconnected,

    /// The serial channel was closed underneath an active operation. Fatal
    /// to the session; the owner decides whether to rebuild.
    #[error("serial channel closed")]
    SerialClosed,

    /// An internal bridge task aborted or panicked.
    #[error("bridge task failed: {0}")]
    Task(tokio::task::JoinError),

    /// The status-probe request pattern is empty.
    #[error("status probe request pattern must not be empty")]
    EmptyProbePattern,
}

impl BridgeError {
    /// True for errors that terminate the session rather than the single
    /// call that raised them.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BridgeError::SerialRead(_)
                | BridgeError::SerialWrite(_)
                | BridgeError::SerialDisconnected
                | BridgeError::SerialClosed
                | BridgeError::Task(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
