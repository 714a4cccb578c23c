//! Transfer progress tracking

use chrono::{DateTime, Local};
use log::info;
use std::time::{Duration, Instant};

/// Progress tracker for a single file transfer
pub struct TransferProgress {
    label: String,
    transferred_bytes: u64,
    started_at: DateTime<Local>,
    start_time: Instant,
}

impl TransferProgress {
    /// Start tracking a transfer of `label` (usually the remote path)
    pub fn start(label: &str) -> Self {
        Self {
            label: label.to_string(),
            transferred_bytes: 0,
            started_at: Local::now(),
            start_time: Instant::now(),
        }
    }

    /// Add bytes to current progress
    pub fn add_bytes(&mut self, bytes: u64) {
        self.transferred_bytes += bytes;
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes
    }

    /// Get transfer speed in bytes per second
    pub fn speed_bps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transferred_bytes as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log the completed transfer and return the byte count
    pub fn finish(self, direction: &str) -> u64 {
        info!(
            "{} '{}' completed: {} in {:?} ({}, started {})",
            direction,
            self.label,
            format_bytes(self.transferred_bytes),
            self.elapsed(),
            format_speed(self.speed_bps()),
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        );
        self.transferred_bytes
    }
}

/// Format bytes as human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format speed as human readable string
pub fn format_speed(bps: f64) -> String {
    format!("{}/s", format_bytes(bps as u64))
}
