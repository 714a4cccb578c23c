//! Connection management for the RAX FTP transfer client
//!
//! Handles both the control channel and per-transfer data connections.

pub mod control;
pub mod data;

// Re-export main types
pub use control::ControlChannel;
pub use data::DataConnection;

use std::io;

use crate::error::RaxFtpClientError;

/// Translate a socket error into the client's taxonomy
pub(crate) fn map_io_error(err: io::Error, context: &str) -> RaxFtpClientError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            RaxFtpClientError::Timeout(format!("{context}: {err}"))
        }
        io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::UnexpectedEof => {
            RaxFtpClientError::ConnectionClosed(format!("{context}: {err}"))
        }
        _ => RaxFtpClientError::Io(err),
    }
}
