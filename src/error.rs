use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the RAX FTP transfer client
#[derive(Debug, Error)]
pub enum RaxFtpClientError {
    // Connection Errors
    #[error("Cannot resolve host '{0}'")]
    HostResolution(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    #[error("Not connected to a server")]
    NotConnected,

    #[error("Not logged in")]
    NotAuthenticated,

    // Protocol Errors
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Authentication failed ({code}): {message}")]
    Authentication { code: u16, message: String },

    #[error("Could not change transfer type ({code}): {message}")]
    ModeChange { code: u16, message: String },

    #[error("A data connection is already open on this session")]
    DataConnectionBusy,

    // Transfer Errors
    #[error("Local file '{}' does not exist", .0.display())]
    LocalFileNotFound(PathBuf),

    #[error("Remote file '{path}' not found ({code}): {message}")]
    RemoteFileNotFound {
        path: String,
        code: u16,
        message: String,
    },

    #[error("No such file or directory on server: {0}")]
    RemoteNotFound(String),

    #[error("Transfer failed ({code}): {message}")]
    TransferFailed { code: u16, message: String },

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    // IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RaxFtpClientError {
    /// Map an unexpected server reply to the closest error kind
    pub fn from_ftp_response(code: u16, message: String) -> Self {
        match code {
            530 | 532 => Self::Authentication { code, message },
            _ if code >= 400 => Self::TransferFailed { code, message },
            _ => Self::Protocol(format!("unexpected reply {code} {message}")),
        }
    }

    /// Whether the control channel is unusable after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::ConnectionClosed(_) | Self::NotConnected
        )
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, RaxFtpClientError>;
