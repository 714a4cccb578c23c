//! RAX FTP Transfer
//!
//! A blocking FTP client that logs in over a control connection and moves
//! files and whole directory trees through passive-mode data connections.
//!
//! ```no_run
//! use rax_ftp_transfer::{ClientConfig, RaxFtpClient};
//! use std::path::Path;
//!
//! fn main() -> rax_ftp_transfer::Result<()> {
//!     let mut client = RaxFtpClient::new(ClientConfig::default());
//!     client.connect("ftp.example.org", "dlpuser", "secret")?;
//!     client.upload(Path::new("reports"), "backup")?;
//!     client.download("backup/reports", Path::new("restored"))?;
//!     client.close()
//! }
//! ```

pub mod client;
pub mod commands;
pub mod config;
pub mod connection;
pub mod error;
pub mod responses;
pub mod terminal;
pub mod transfer;

pub use client::{ClientState, RaxFtpClient, TransferType};
pub use config::ClientConfig;
pub use error::{RaxFtpClientError, Result};
pub use transfer::{DirectoryEntry, TransferSummary};
