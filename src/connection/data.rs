//! Data connection management for FTP transfers

use log::{debug, info, warn};
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::connection::map_io_error;
use crate::error::{RaxFtpClientError, Result};

/// A passive-mode data connection, owned by exactly one transfer.
///
/// The shared `busy` flag belongs to the control channel that negotiated this
/// connection; it stays raised until the connection is closed or dropped.
pub struct DataConnection {
    stream: Option<TcpStream>,
    addr: SocketAddr,
    busy: Arc<AtomicBool>,
}

impl DataConnection {
    /// Connect to the port the server announced in its PASV reply
    pub fn connect(addr: SocketAddr, timeout: Duration, busy: Arc<AtomicBool>) -> Result<Self> {
        info!("Opening passive data connection to {addr}");

        let stream = TcpStream::connect_timeout(&addr, timeout).map_err(|e| {
            RaxFtpClientError::Connect(format!("data connection to {addr} failed: {e}"))
        })?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;

        busy.store(true, Ordering::SeqCst);
        Ok(Self {
            stream: Some(stream),
            addr,
            busy,
        })
    }

    fn stream_mut(&mut self) -> Result<&mut TcpStream> {
        self.stream.as_mut().ok_or_else(|| {
            RaxFtpClientError::ConnectionClosed("data connection already closed".to_string())
        })
    }

    /// Send data over the connection
    pub fn send_data(&mut self, data: &[u8]) -> Result<usize> {
        let stream = self.stream_mut()?;
        stream
            .write(data)
            .map_err(|e| map_io_error(e, "sending on data connection"))
    }

    /// Receive data from the connection; `Ok(0)` means the server closed it
    pub fn receive_data(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let stream = self.stream_mut()?;
        stream
            .read(buffer)
            .map_err(|e| map_io_error(e, "reading from data connection"))
    }

    /// Read until the server closes the data connection
    pub fn receive_all(&mut self, chunk_size: usize) -> Result<Vec<u8>> {
        let mut payload = Vec::new();
        let mut buffer = vec![0u8; chunk_size.max(1)];
        loop {
            match self.receive_data(&mut buffer)? {
                0 => break,
                n => payload.extend_from_slice(&buffer[..n]),
            }
        }
        debug!("Received {} bytes from {}", payload.len(), self.addr);
        Ok(payload)
    }

    /// Close the data connection; safe to call more than once
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                // The server may already have torn its side down
                warn!("Data connection shutdown to {}: {e}", self.addr);
            }
            info!("Passive data connection to {} closed", self.addr);
        }
        self.busy.store(false, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    pub fn peer(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for DataConnection {
    fn drop(&mut self) {
        self.close();
    }
}
