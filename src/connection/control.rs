//! Control channel for the RAX FTP transfer client
//!
//! Owns the TCP control socket: command framing, reply reading with
//! multi-line continuation, and passive-mode negotiation.

use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::commands::FtpCommand;
use crate::connection::{DataConnection, map_io_error};
use crate::error::{RaxFtpClientError, Result};
use crate::responses::{FtpResponse, PASSIVE_MODE, is_final_line, parse_passive_port, parse_response};

/// Standard FTP control port
pub const DEFAULT_CONTROL_PORT: u16 = 21;

/// Manages the FTP control connection
pub struct ControlChannel {
    reader: Option<BufReader<TcpStream>>,
    writer: Option<TcpStream>,
    peer: Option<SocketAddr>,
    port: u16,
    timeout: Duration,
    transfer_open: Arc<AtomicBool>,
}

impl ControlChannel {
    /// Create an unconnected control channel
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self {
            reader: None,
            writer: None,
            peer: None,
            port,
            timeout,
            transfer_open: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Resolve `host`, connect to the control port and read the greeting
    pub fn connect(&mut self, host: &str) -> Result<FtpResponse> {
        if self.is_connected() {
            warn!("Control channel already connected to {:?}; reconnecting", self.peer);
            self.close();
        }

        let addrs: Vec<SocketAddr> = (host, self.port)
            .to_socket_addrs()
            .map_err(|_| RaxFtpClientError::HostResolution(host.to_string()))?
            .collect();
        if addrs.is_empty() {
            return Err(RaxFtpClientError::HostResolution(host.to_string()));
        }

        let mut last_error = None;
        let mut connected = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    connected = Some((stream, addr));
                    break;
                }
                Err(e) => {
                    debug!("Connection attempt to {addr} failed: {e}");
                    last_error = Some(format!("{addr}: {e}"));
                }
            }
        }
        let (stream, addr) = connected.ok_or_else(|| {
            RaxFtpClientError::Connect(last_error.unwrap_or_else(|| host.to_string()))
        })?;

        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;
        self.writer = Some(stream.try_clone()?);
        self.reader = Some(BufReader::new(stream));
        self.peer = Some(addr);
        info!("Connected to FTP server at {addr}");

        match self.get_response() {
            Ok(greeting) => {
                info!("Server greeting: {greeting}");
                Ok(greeting)
            }
            Err(e) => {
                error!("No usable greeting from {addr}: {e}");
                self.close();
                Err(RaxFtpClientError::Protocol(format!(
                    "no greeting from {addr}: {e}"
                )))
            }
        }
    }

    /// Check if the connection is active
    pub fn is_connected(&self) -> bool {
        self.writer.is_some()
    }

    /// Address of the server the control channel is connected to
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Change the read/write timeout, applying it to the live socket if any
    pub fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        if let Some(writer) = self.writer.as_ref() {
            writer.set_read_timeout(Some(timeout))?;
            writer.set_write_timeout(Some(timeout))?;
        }
        debug!("Control channel timeout set to {timeout:?}");
        Ok(())
    }

    /// Whether a data connection negotiated on this channel is still open
    pub fn transfer_in_progress(&self) -> bool {
        self.transfer_open.load(Ordering::SeqCst)
    }

    /// Write one request line; trailing whitespace is replaced by CRLF
    pub fn send_request(&mut self, request: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            RaxFtpClientError::ConnectionClosed("control channel is not open".to_string())
        })?;

        let line = format!("{}\r\n", request.trim_end());
        let result = writer.write_all(line.as_bytes()).and_then(|_| writer.flush());

        if let Err(e) = result {
            let err = map_io_error(e, "sending on control channel");
            if err.is_fatal() {
                self.close();
            }
            return Err(err);
        }
        Ok(())
    }

    /// Send an FTP command
    pub fn send_command(&mut self, command: &FtpCommand) -> Result<()> {
        if command.uses_data_connection() && !self.transfer_in_progress() {
            return Err(RaxFtpClientError::Protocol(format!(
                "{command} requires an open data connection"
            )));
        }

        debug!("Sending command: {command}");
        self.send_request(&command.to_ftp_string())
    }

    /// Read one complete reply, accumulating multi-line continuation
    pub fn get_response(&mut self) -> Result<FtpResponse> {
        let first = self.read_line()?;
        let opening = parse_response(&first)?;
        let code = format!("{:03}", opening.code);

        let mut lines = vec![first];
        if !is_final_line(&lines[0], &code) {
            loop {
                let line = self.read_line()?;
                let done = is_final_line(&line, &code);
                lines.push(line);
                if done {
                    break;
                }
            }
        }

        let response = FtpResponse::from_lines(lines)?;
        debug!("Received response: {response}");
        Ok(response)
    }

    /// Send a command and read its reply
    pub fn execute(&mut self, command: &FtpCommand) -> Result<FtpResponse> {
        self.send_command(command)?;
        self.get_response()
    }

    /// Read a line from the control connection, without its terminator
    fn read_line(&mut self) -> Result<String> {
        let reader = self.reader.as_mut().ok_or_else(|| {
            RaxFtpClientError::ConnectionClosed("control channel is not open".to_string())
        })?;

        let mut raw = Vec::new();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => {
                self.close();
                Err(RaxFtpClientError::ConnectionClosed(
                    "server closed the control connection".to_string(),
                ))
            }
            Ok(_) => {
                let line = String::from_utf8_lossy(&raw)
                    .trim_end_matches(['\r', '\n'])
                    .to_string();
                debug!("Read line: {line}");
                Ok(line)
            }
            Err(e) => {
                let err = map_io_error(e, "waiting for server reply");
                // A partial reply cannot be recovered; drop the channel
                error!("Control channel read failed: {err}");
                self.close();
                Err(err)
            }
        }
    }

    /// Negotiate passive mode and connect to the announced data port.
    ///
    /// The address in the reply is ignored; the data connection goes to the
    /// host the control channel is already connected to.
    pub fn open_passive_data_connection(&mut self, timeout: Duration) -> Result<DataConnection> {
        if self.transfer_in_progress() {
            return Err(RaxFtpClientError::DataConnectionBusy);
        }

        let response = self.execute(&FtpCommand::Pasv)?;
        if response.code != PASSIVE_MODE {
            return Err(RaxFtpClientError::Protocol(format!(
                "PASV refused: {response}"
            )));
        }

        let port = parse_passive_port(&response.message)?;
        let peer = self.peer.ok_or(RaxFtpClientError::NotConnected)?;
        DataConnection::connect(
            SocketAddr::new(peer.ip(), port),
            timeout,
            Arc::clone(&self.transfer_open),
        )
    }

    /// Close the control connection; a no-op when already closed
    pub fn close(&mut self) {
        self.reader = None;
        if let Some(stream) = self.writer.take() {
            info!("Disconnecting from FTP server");
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!("Control socket shutdown: {e}");
            }
        }
        self.peer = None;
    }
}

impl Drop for ControlChannel {
    fn drop(&mut self) {
        self.close();
    }
}
