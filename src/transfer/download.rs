//! File download functionality

use log::debug;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::connection::DataConnection;
use crate::error::Result;
use crate::transfer::progress::TransferProgress;

/// Stream the data connection into `local_path` until EOF, returning the bytes written.
///
/// Parent directories are created as needed. A failure midway leaves the
/// partial file on disk.
pub fn download_file_with_progress(
    data_connection: &mut DataConnection,
    local_path: &Path,
    remote_path: &str,
    chunk_size: usize,
) -> Result<u64> {
    if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(local_path)?);
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut progress = TransferProgress::start(remote_path);

    loop {
        let bytes_received = data_connection.receive_data(&mut buffer)?;
        if bytes_received == 0 {
            debug!(
                "Reached end of data, {} bytes received",
                progress.transferred_bytes()
            );
            break;
        }
        writer.write_all(&buffer[..bytes_received])?;
        progress.add_bytes(bytes_received as u64);
    }

    writer.flush()?;
    Ok(progress.finish("Download"))
}
