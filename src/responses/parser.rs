//! FTP response parsing functionality

use log::debug;

use crate::error::{RaxFtpClientError, Result};
use crate::responses::status_codes;

/// Parsed FTP response from server
#[derive(Debug, Clone, PartialEq)]
pub struct FtpResponse {
    /// Response code (e.g., 230, 530, 331)
    pub code: u16,

    /// Message of the final reply line (e.g., "User logged in, proceed")
    pub message: String,

    /// Every physical line of the reply, continuation lines included
    pub lines: Vec<String>,
}

impl FtpResponse {
    /// Create a new single-line FTP response
    pub fn new(code: u16, message: String) -> Self {
        let lines = vec![format!("{code} {message}")];
        Self {
            code,
            message,
            lines,
        }
    }

    /// Build a response from the physical lines of a (possibly multi-line) reply
    pub fn from_lines(lines: Vec<String>) -> Result<Self> {
        let first = lines
            .first()
            .ok_or_else(|| RaxFtpClientError::Protocol("Empty response".to_string()))?;
        let last = lines.last().unwrap_or(first);

        let opening = parse_response(first)?;
        let closing = parse_response(last)?;
        if opening.code != closing.code {
            return Err(RaxFtpClientError::Protocol(format!(
                "Multi-line reply opened with {} but closed with {}",
                opening.code, closing.code
            )));
        }

        Ok(Self {
            code: closing.code,
            message: closing.message,
            lines,
        })
    }

    pub fn is_error(&self) -> bool {
        status_codes::is_error(self.code)
    }

    pub fn is_preliminary(&self) -> bool {
        status_codes::is_preliminary(self.code)
    }

    pub fn is_success(&self) -> bool {
        status_codes::is_success(self.code)
    }
}

impl std::fmt::Display for FtpResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.message)
    }
}

/// Parse a single reply line into structured response
pub fn parse_response(line: &str) -> Result<FtpResponse> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.len() < 3 {
        return Err(RaxFtpClientError::Protocol(format!(
            "Response too short: '{line}'"
        )));
    }

    let code_str = line.get(0..3).unwrap_or_default();
    if !code_str.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RaxFtpClientError::Protocol(format!(
            "Invalid response code: '{line}'"
        )));
    }
    let code = code_str
        .parse::<u16>()
        .map_err(|_| RaxFtpClientError::Protocol(format!("Invalid response code: {code_str}")))?;

    // Skip the single separator character after the code
    let message = line.get(4..).unwrap_or_default().trim().to_string();

    debug!("Parsed FTP response: code={code}, message='{message}'");

    Ok(FtpResponse {
        code,
        message,
        lines: vec![line.to_string()],
    })
}

/// Whether `line` terminates a reply opened with `code` ("NNN text" rather than "NNN-text")
pub fn is_final_line(line: &str, code: &str) -> bool {
    let line = line.trim_end_matches(['\r', '\n']);
    if !line.starts_with(code) {
        return false;
    }
    match line.as_bytes().get(code.len()) {
        None => true,
        Some(b' ') => true,
        Some(_) => false,
    }
}

/// Extract the data port from a 227 reply such as
/// "Entering Passive Mode (127,0,0,1,200,50)".
///
/// The four address numbers are validated but not used; callers connect to
/// the control connection's peer instead.
pub fn parse_passive_port(message: &str) -> Result<u16> {
    let tuple = match (message.find('('), message.rfind(')')) {
        (Some(start), Some(end)) if start < end => &message[start + 1..end],
        // Some servers omit the parentheses
        _ => message
            .rsplit(' ')
            .next()
            .unwrap_or_default()
            .trim_end_matches('.'),
    };

    let numbers = tuple
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| {
            RaxFtpClientError::Protocol(format!("Malformed passive reply: '{message}'"))
        })?;

    if numbers.len() != 6 {
        return Err(RaxFtpClientError::Protocol(format!(
            "Passive reply must carry six numbers: '{message}'"
        )));
    }

    let port = u16::from(numbers[4]) * 256 + u16::from(numbers[5]);
    if port == 0 {
        return Err(RaxFtpClientError::Protocol(
            "Passive reply announced port 0".to_string(),
        ));
    }

    Ok(port)
}
