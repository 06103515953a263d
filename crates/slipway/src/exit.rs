use std::fmt;
use std::io;

use slipway_bridge::BridgeError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const SERIAL_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
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

pub fn io_code(err: &io::Error) -> i32 {
    match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::AddrInUse | io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    }
}

pub fn bridge_error(context: &str, err: BridgeError) -> CliError {
    let code = match &err {
        BridgeError::Bind { source, .. } | BridgeError::SerialOpen { source, .. } => {
            io_code(source)
        }
        BridgeError::SerialRead(_)
        | BridgeError::SerialWrite(_)
        | BridgeError::SerialDisconnected
        | BridgeError::SerialClosed => SERIAL_ERROR,
        BridgeError::SerialAlreadyOpen | BridgeError::EmptyProbePattern => USAGE,
        BridgeError::Task(_) => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_faults_map_to_serial_exit_code() {
        let err = bridge_error(
            "session failed",
            BridgeError::SerialRead(io::Error::other("boom")),
        );
        assert_eq!(err.code, SERIAL_ERROR);
        assert!(err.message.contains("session failed"));
    }

    #[test]
    fn permission_denied_maps_through_io_kind() {
        let err = bridge_error(
            "bridge startup failed",
            BridgeError::SerialOpen {
                name: "/dev/ttyACM0".into(),
                source: io::ErrorKind::PermissionDenied.into(),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);
    }
}
