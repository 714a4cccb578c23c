//! Directory listing functionality for FTP transfers

use log::{debug, info};

use crate::connection::DataConnection;
use crate::error::Result;

/// One line of a LIST reply
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    /// The line exactly as the server sent it
    pub raw: String,
    pub name: String,
    pub is_directory: bool,
}

impl DirectoryEntry {
    /// Parse one listing line. Long-format lines ("drwxr-xr-x 2 ftp ftp 4096 Jan 01 10:00 pub")
    /// yield the trailing name; anything else is taken as a bare name.
    pub fn from_line(line: &str) -> Self {
        let raw = line.trim_end_matches(['\r', '\n']).to_string();
        let long_format = looks_like_unix_listing(&raw);
        let is_directory = long_format && raw.starts_with('d');

        let name = if long_format {
            let name = skip_fields(&raw, 8).unwrap_or(raw.as_str());
            if raw.starts_with('l') {
                // Symlinks are listed as "name -> target"
                name.split(" -> ").next().unwrap_or(name)
            } else {
                name
            }
        } else {
            raw.trim()
        };

        Self {
            name: name.to_string(),
            is_directory,
            raw,
        }
    }

    /// "." and ".." entries some servers include
    pub fn is_navigation(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}

fn looks_like_unix_listing(line: &str) -> bool {
    let mut fields = line.split_whitespace();
    let permissions = fields.next().unwrap_or_default();
    permissions.len() >= 10
        && permissions.starts_with(['-', 'd', 'l', 'b', 'c', 'p', 's'])
        && fields.count() >= 8
}

/// Return the remainder of `line` after `count` whitespace-separated fields
fn skip_fields(line: &str, count: usize) -> Option<&str> {
    let mut rest = line.trim_start();
    for _ in 0..count {
        let end = rest.find(char::is_whitespace)?;
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() { None } else { Some(rest) }
}

/// Split a listing payload into non-empty lines, dropping "total N" summaries
pub fn split_listing(payload: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(payload)
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !is_total_line(line))
        .map(str::to_string)
        .collect()
}

fn is_total_line(line: &str) -> bool {
    line.strip_prefix("total ")
        .is_some_and(|count| count.trim().bytes().all(|b| b.is_ascii_digit()))
}

/// Read a directory listing from the data connection until the server closes it
pub fn read_directory_listing(
    data_connection: &mut DataConnection,
    chunk_size: usize,
) -> Result<Vec<String>> {
    info!("Reading directory listing from {}", data_connection.peer());

    let payload = data_connection.receive_all(chunk_size)?;
    let listing = split_listing(&payload);

    debug!("Received {} bytes of directory listing data", payload.len());
    info!("Successfully read {} directory entries", listing.len());
    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_line() {
        let entry =
            DirectoryEntry::from_line("drwxr-xr-x    2 ftp      ftp          4096 Mar 11 09:15 pub");
        assert!(entry.is_directory);
        assert_eq!(entry.name, "pub");
    }

    #[test]
    fn test_file_line_keeps_spaces_in_name() {
        let entry = DirectoryEntry::from_line(
            "-rw-r--r--    1 ftp      ftp        161049 Mar 11  2023 quarterly report.pdf\r",
        );
        assert!(!entry.is_directory);
        assert_eq!(entry.name, "quarterly report.pdf");
        assert!(!entry.raw.ends_with('\r'));
    }

    #[test]
    fn test_symlink_line() {
        let entry = DirectoryEntry::from_line(
            "lrwxrwxrwx    1 ftp      ftp             7 Mar 11 09:15 latest -> v1.2.0",
        );
        assert!(!entry.is_directory);
        assert_eq!(entry.name, "latest");
    }

    #[test]
    fn test_bare_name_line() {
        let entry = DirectoryEntry::from_line("notes.txt");
        assert_eq!(entry.name, "notes.txt");
        assert!(!entry.is_directory);

        // Only the long-format permission field marks a directory
        let entry = DirectoryEntry::from_line("data.csv");
        assert!(!entry.is_directory);
    }

    #[test]
    fn test_navigation_entries() {
        let entry = DirectoryEntry::from_line("drwxr-xr-x 2 ftp ftp 4096 Mar 11 09:15 ..");
        assert!(entry.is_navigation());
    }

    #[test]
    fn test_split_listing_drops_empty_and_total_lines() {
        let payload = b"total 8\r\n-rw-r--r-- 1 a a 3 Jan 1 2024 a.txt\r\n\r\ndrwxr-xr-x 2 a a 0 Jan 1 2024 sub\r\n";
        let lines = split_listing(payload);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("a.txt"));
        assert!(lines[1].ends_with("sub"));
    }

    #[test]
    fn test_split_listing_keeps_names_starting_with_total() {
        let lines = split_listing(b"total costs.csv\n");
        assert_eq!(lines, vec!["total costs.csv".to_string()]);
    }
}
