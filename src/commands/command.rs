//! FTP Command definitions

use crate::client::TransferType;

/// Wire commands issued by the RAX FTP transfer client
#[derive(Debug, Clone, PartialEq)]
pub enum FtpCommand {
    /// USER - Username for authentication
    User(String),

    /// PASS - Password for authentication
    Pass(String),

    /// TYPE - Set transfer type (A or I)
    Type(TransferType),

    /// PASV - Enter passive mode
    Pasv,

    /// LIST - Long-format directory listing, optionally recursive (`LIST -R`)
    List { path: String, recursive: bool },

    /// NLST - Bare name listing
    Nlst(String),

    /// STOR - Store/upload file to server
    Stor(String),

    /// RETR - Retrieve/download file from server
    Retr(String),

    /// MKD - Create directory on server
    Mkd(String),

    /// QUIT - Log out and close the control connection
    Quit,
}

impl FtpCommand {
    /// Convert command to FTP protocol string
    pub fn to_ftp_string(&self) -> String {
        match self {
            FtpCommand::User(username) => format!("USER {username}"),
            FtpCommand::Pass(password) => format!("PASS {password}"),
            FtpCommand::Type(transfer_type) => format!("TYPE {}", transfer_type.code()),
            FtpCommand::Pasv => "PASV".to_string(),
            FtpCommand::List { path, recursive } => {
                let verb = if *recursive { "LIST -R" } else { "LIST" };
                with_argument(verb, path)
            }
            FtpCommand::Nlst(path) => with_argument("NLST", path),
            FtpCommand::Stor(path) => format!("STOR {path}"),
            FtpCommand::Retr(path) => format!("RETR {path}"),
            FtpCommand::Mkd(path) => format!("MKD {path}"),
            FtpCommand::Quit => "QUIT".to_string(),
        }
    }

    /// Whether the command opens a transfer on a data connection
    pub fn uses_data_connection(&self) -> bool {
        matches!(
            self,
            FtpCommand::List { .. } | FtpCommand::Nlst(_) | FtpCommand::Stor(_) | FtpCommand::Retr(_)
        )
    }
}

fn with_argument(verb: &str, argument: &str) -> String {
    if argument.is_empty() {
        verb.to_string()
    } else {
        format!("{verb} {argument}")
    }
}

impl std::fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FtpCommand::Pass(_) => write!(f, "PASS [hidden]"),
            other => write!(f, "{}", other.to_ftp_string()),
        }
    }
}
