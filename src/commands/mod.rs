//! FTP Commands module
//!
//! Wire commands sent on the control channel, plus the shell commands a user
//! types at the prompt.

pub mod command;
pub mod help;
pub mod parser;

// Re-export the main types for easier importing
pub use command::FtpCommand;
pub use help::get_help_text;
pub use parser::{UserCommand, parse_command};
