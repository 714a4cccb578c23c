//! Directory listing display functionality

use crate::transfer::DirectoryEntry;

/// Render listing entries as "Type  Name" rows followed by the raw server line
pub fn format_directory_listing(entries: &[DirectoryEntry]) -> String {
    if entries.is_empty() {
        return "Directory is empty.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{:<6} {:<30} {}\n", "Type", "Name", "Details"));
    output.push_str(&format!("{}\n", "-".repeat(68)));

    for entry in entries {
        let kind = if entry.is_directory { "Dir" } else { "File" };
        output.push_str(&format!(
            "{:<6} {:<30} {}\n",
            kind,
            truncate_name(&entry.name, 30),
            entry.raw
        ));
    }

    output
}

/// Truncate long names to fit in column width
fn truncate_name(name: &str, max_width: usize) -> String {
    if name.chars().count() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        let kept: String = name.chars().take(max_width - 3).collect();
        format!("{kept}...")
    } else {
        name.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("short", 10), "short");
        assert_eq!(truncate_name("verylongfilename.txt", 10), "verylon...");
        assert_eq!(truncate_name("test", 2), "te");
    }

    #[test]
    fn test_empty_listing() {
        assert_eq!(format_directory_listing(&[]), "Directory is empty.");
    }

    #[test]
    fn test_listing_rows() {
        let entries = vec![
            DirectoryEntry::from_line("drwxr-xr-x 2 ftp ftp 4096 Mar 11 09:15 pub"),
            DirectoryEntry::from_line("-rw-r--r-- 1 ftp ftp 12 Mar 11 09:15 readme.txt"),
        ];
        let output = format_directory_listing(&entries);
        let rows: Vec<&str> = output.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[2].starts_with("Dir    pub"));
        assert!(rows[3].starts_with("File   readme.txt"));
    }
}
