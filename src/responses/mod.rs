//! FTP response parsing module

pub mod parser;
pub mod status_codes;

// Re-export main types
pub use parser::{FtpResponse, is_final_line, parse_passive_port, parse_response};
pub use status_codes::*;
