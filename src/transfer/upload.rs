//! File upload functionality

use log::{debug, error};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::connection::DataConnection;
use crate::error::{RaxFtpClientError, Result};
use crate::transfer::progress::TransferProgress;

/// Reply code reported when the data connection stops accepting bytes
const DATA_CONNECTION_ABORTED: u16 = 426;

/// Stream a local file through the data connection, returning the bytes sent
pub fn upload_file_with_progress(
    data_connection: &mut DataConnection,
    local_path: &Path,
    remote_path: &str,
    chunk_size: usize,
) -> Result<u64> {
    let file = File::open(local_path)
        .map_err(|_| RaxFtpClientError::LocalFileNotFound(local_path.to_path_buf()))?;

    let mut progress = TransferProgress::start(remote_path);
    let mut reader = BufReader::new(file);
    let mut buffer = vec![0u8; chunk_size.max(1)];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }

        let mut chunk = &buffer[..bytes_read];
        while !chunk.is_empty() {
            let bytes_sent = data_connection.send_data(chunk)?;
            if bytes_sent == 0 {
                error!("Data connection accepted no bytes while uploading '{remote_path}'");
                return Err(RaxFtpClientError::TransferFailed {
                    code: DATA_CONNECTION_ABORTED,
                    message: format!("server stopped accepting data for '{remote_path}'"),
                });
            }
            progress.add_bytes(bytes_sent as u64);
            chunk = &chunk[bytes_sent..];
        }
        debug!("Sent {} bytes so far", progress.transferred_bytes());
    }

    Ok(progress.finish("Upload"))
}

/// Validate that a file can be uploaded; runs before any network traffic
pub fn validate_upload_file(local_path: &Path) -> Result<()> {
    if !local_path.is_file() {
        return Err(RaxFtpClientError::LocalFileNotFound(
            local_path.to_path_buf(),
        ));
    }
    Ok(())
}
