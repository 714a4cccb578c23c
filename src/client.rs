use log::{debug, info, warn};
use std::path::Path;

use crate::commands::FtpCommand;
use crate::config::ClientConfig;
use crate::connection::{ControlChannel, DataConnection};
use crate::error::{RaxFtpClientError, Result};
use crate::responses::{
    DATA_CONNECTION_ALREADY_OPEN, FILE_UNAVAILABLE, FtpResponse, OPENING_DATA_CONNECTION,
    SERVICE_READY, USER_LOGGED_IN, USER_NAME_OKAY_NEED_PASSWORD,
};
use crate::transfer::{
    DirectoryEntry, download_file_with_progress, read_directory_listing, remote_parent,
    remote_prefixes, upload_file_with_progress, validate_upload_file,
};

/// Reply some servers send for MKD on an existing directory
const DIRECTORY_ALREADY_EXISTS: u16 = 521;

/// Session-wide representation type, changed only with TYPE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransferType {
    Ascii,
    #[default]
    Binary,
}

impl TransferType {
    /// Argument of the TYPE command
    pub fn code(&self) -> char {
        match self {
            TransferType::Ascii => 'A',
            TransferType::Binary => 'I',
        }
    }
}

impl std::fmt::Display for TransferType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferType::Ascii => write!(f, "ascii"),
            TransferType::Binary => write!(f, "binary"),
        }
    }
}

/// Client connection state
#[derive(Debug, Clone, PartialEq)]
pub enum ClientState {
    Disconnected,
    Connected,
    Authenticated,
}

impl std::fmt::Display for ClientState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientState::Disconnected => write!(f, "disconnected"),
            ClientState::Connected => write!(f, "connected"),
            ClientState::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// One FTP session: a control channel, its transfer type and login state
pub struct RaxFtpClient {
    pub(crate) connection: ControlChannel,
    transfer_type: TransferType,
    logged_in: bool,
    pub(crate) config: ClientConfig,
}

impl RaxFtpClient {
    /// Create a new FTP client with the given configuration
    pub fn new(config: ClientConfig) -> Self {
        info!("Creating RAX FTP client with config: {config}");

        Self {
            connection: ControlChannel::new(config.port, config.control_timeout()),
            transfer_type: TransferType::default(),
            logged_in: false,
            config,
        }
    }

    /// Connect and log in with the host and credentials from the configuration
    pub fn connect_configured(&mut self) -> Result<()> {
        let host = self.config.host.clone();
        let username = self.config.username.clone();
        let password = self.config.password.clone();
        self.connect(&host, &username, &password)
    }

    /// Open the control channel, log in, and switch to binary mode
    pub fn connect(&mut self, host: &str, user: &str, password: &str) -> Result<()> {
        if self.connection.is_connected() {
            warn!("Already connected; closing the previous session first");
            self.close()?;
        }

        let greeting = self.connection.connect(host)?;
        if greeting.code != SERVICE_READY {
            self.connection.close();
            return Err(RaxFtpClientError::Connect(format!(
                "{host} is not ready: {greeting}"
            )));
        }

        if let Err(e) = self.login(user, password) {
            self.connection.close();
            self.logged_in = false;
            return Err(e);
        }

        self.set_binary()
    }

    fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let response = self.connection.execute(&FtpCommand::User(user.to_string()))?;
        if response.code != USER_NAME_OKAY_NEED_PASSWORD {
            return Err(authentication_error(response));
        }

        let response = self
            .connection
            .execute(&FtpCommand::Pass(password.to_string()))?;
        if response.code != USER_LOGGED_IN {
            return Err(authentication_error(response));
        }

        info!("Logged in as '{user}'");
        self.logged_in = true;
        Ok(())
    }

    /// Send QUIT and close the control channel; a no-op when not connected
    pub fn close(&mut self) -> Result<()> {
        if self.connection.is_connected() {
            match self.connection.execute(&FtpCommand::Quit) {
                Ok(response) => debug!("QUIT answered with {response}"),
                Err(e) => debug!("QUIT failed, closing anyway: {e}"),
            }
            self.connection.close();
        }
        self.logged_in = false;
        self.transfer_type = TransferType::default();
        Ok(())
    }

    /// Get current client state for display
    pub fn state(&self) -> ClientState {
        if !self.connection.is_connected() {
            ClientState::Disconnected
        } else if self.logged_in {
            ClientState::Authenticated
        } else {
            ClientState::Connected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in && self.connection.is_connected()
    }

    pub fn transfer_type(&self) -> TransferType {
        self.transfer_type
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Precondition shared by every authenticated operation
    pub(crate) fn ensure_ready(&mut self) -> Result<()> {
        if !self.connection.is_connected() {
            // A timeout or EOF may have torn the channel down mid-session
            self.logged_in = false;
            return Err(RaxFtpClientError::NotConnected);
        }
        if !self.logged_in {
            return Err(RaxFtpClientError::NotAuthenticated);
        }
        Ok(())
    }

    /// Switch to ASCII transfers (TYPE A)
    pub fn set_ascii(&mut self) -> Result<()> {
        self.set_transfer_type(TransferType::Ascii)
    }

    /// Switch to binary transfers (TYPE I)
    pub fn set_binary(&mut self) -> Result<()> {
        self.set_transfer_type(TransferType::Binary)
    }

    fn set_transfer_type(&mut self, transfer_type: TransferType) -> Result<()> {
        self.ensure_ready()?;

        let response = self.connection.execute(&FtpCommand::Type(transfer_type))?;
        if response.is_error() {
            warn!("Server refused TYPE {}: {response}", transfer_type.code());
            return Err(RaxFtpClientError::ModeChange {
                code: response.code,
                message: response.message,
            });
        }

        debug!("Transfer type is now {transfer_type}");
        self.transfer_type = transfer_type;
        Ok(())
    }

    /// List a remote directory (LIST, or LIST -R when `recursive`)
    pub fn list(&mut self, directory: &str, recursive: bool) -> Result<Vec<DirectoryEntry>> {
        self.ensure_ready()?;

        let lines = self.run_listing(
            FtpCommand::List {
                path: directory.to_string(),
                recursive,
            },
            directory,
        )?;
        Ok(lines.iter().map(|line| DirectoryEntry::from_line(line)).collect())
    }

    /// List bare names in a remote directory (NLST)
    pub fn name_list(&mut self, directory: &str) -> Result<Vec<String>> {
        self.ensure_ready()?;

        let lines = self.run_listing(FtpCommand::Nlst(directory.to_string()), directory)?;
        Ok(lines.into_iter().map(|line| line.trim().to_string()).collect())
    }

    fn run_listing(&mut self, command: FtpCommand, directory: &str) -> Result<Vec<String>> {
        let mut data = self.open_data_connection()?;

        let response = self.connection.execute(&command)?;
        if !response.is_preliminary() {
            data.close();
            return Err(match response.code {
                FILE_UNAVAILABLE | 450 => RaxFtpClientError::RemoteNotFound(directory.to_string()),
                code => RaxFtpClientError::from_ftp_response(code, response.message),
            });
        }

        let listing = read_directory_listing(&mut data, self.config.buffer_size);
        data.close();
        let listing = match listing {
            Ok(listing) => listing,
            Err(e) => {
                self.drain_completion();
                return Err(e);
            }
        };

        self.expect_transfer_complete()?;
        Ok(listing)
    }

    /// Create one remote directory; an existing directory is not an error
    pub fn make_directory(&mut self, path: &str) -> Result<()> {
        self.ensure_ready()?;

        let response = self.connection.execute(&FtpCommand::Mkd(path.to_string()))?;
        match response.code {
            code if response.is_success() => {
                debug!("Created remote directory '{path}' ({code})");
                Ok(())
            }
            FILE_UNAVAILABLE | DIRECTORY_ALREADY_EXISTS => {
                debug!("Remote directory '{path}' already exists: {response}");
                Ok(())
            }
            code => Err(RaxFtpClientError::from_ftp_response(code, response.message)),
        }
    }

    /// Create every prefix of a remote path, one directory at a time
    pub fn make_directories(&mut self, path: &str) -> Result<()> {
        for prefix in remote_prefixes(path) {
            self.make_directory(&prefix)?;
        }
        Ok(())
    }

    /// Upload a single local file, creating the remote parent directories first
    pub fn upload_file(&mut self, local: &Path, remote: &str) -> Result<u64> {
        self.ensure_ready()?;
        validate_upload_file(local)?;

        if let Some(parent) = remote_parent(remote) {
            self.make_directories(parent)?;
        }

        self.send_file(local, remote)
    }

    /// Upload into a remote directory that is known to exist
    pub(crate) fn send_file(&mut self, local: &Path, remote: &str) -> Result<u64> {
        validate_upload_file(local)?;
        self.with_transfer_timeout(|client| client.store(local, remote))
    }

    fn store(&mut self, local: &Path, remote: &str) -> Result<u64> {
        let mut data = self.open_data_connection()?;

        let response = self.connection.execute(&FtpCommand::Stor(remote.to_string()))?;
        if !matches!(
            response.code,
            OPENING_DATA_CONNECTION | DATA_CONNECTION_ALREADY_OPEN
        ) {
            data.close();
            return Err(transfer_failed(response));
        }

        let sent =
            upload_file_with_progress(&mut data, local, remote, self.config.buffer_size);
        // Closing the socket is what tells the server the file is complete
        data.close();
        let sent = match sent {
            Ok(bytes) => bytes,
            Err(e) => {
                self.drain_completion();
                return Err(e);
            }
        };

        self.expect_transfer_complete()?;
        info!("Uploaded '{}' to '{remote}'", local.display());
        Ok(sent)
    }

    /// Download a single remote file to `local`
    pub fn download_file(&mut self, remote: &str, local: &Path) -> Result<u64> {
        self.ensure_ready()?;
        self.with_transfer_timeout(|client| client.retrieve(remote, local))
    }

    fn retrieve(&mut self, remote: &str, local: &Path) -> Result<u64> {
        let mut data = self.open_data_connection()?;

        let response = self.connection.execute(&FtpCommand::Retr(remote.to_string()))?;
        if response.is_error() {
            data.close();
            return Err(RaxFtpClientError::RemoteFileNotFound {
                path: remote.to_string(),
                code: response.code,
                message: response.message,
            });
        }
        if !response.is_preliminary() {
            data.close();
            return Err(RaxFtpClientError::from_ftp_response(
                response.code,
                response.message,
            ));
        }

        let received =
            download_file_with_progress(&mut data, local, remote, self.config.buffer_size);
        data.close();
        let received = match received {
            Ok(bytes) => bytes,
            Err(e) => {
                self.drain_completion();
                return Err(e);
            }
        };

        self.expect_transfer_complete()?;
        info!("Downloaded '{remote}' to '{}'", local.display());
        Ok(received)
    }

    fn open_data_connection(&mut self) -> Result<DataConnection> {
        self.connection
            .open_passive_data_connection(self.config.transfer_timeout())
    }

    /// Read the reply that ends a transfer; an error code here is authoritative
    fn expect_transfer_complete(&mut self) -> Result<FtpResponse> {
        let response = self.connection.get_response()?;
        if response.is_error() {
            return Err(transfer_failed(response));
        }
        Ok(response)
    }

    /// Consume the completion reply after a local failure so the channel stays in step
    fn drain_completion(&mut self) {
        if self.connection.is_connected() {
            match self.connection.get_response() {
                Ok(response) => debug!("Discarded completion reply after failure: {response}"),
                Err(e) => debug!("No completion reply after failure: {e}"),
            }
        }
    }

    /// Run `operation` with the longer transfer timeout on the control channel
    fn with_transfer_timeout<T>(
        &mut self,
        operation: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.connection
            .set_timeout(self.config.transfer_timeout())?;
        let result = operation(self);
        // Restored even on a closed channel so a reconnect starts from the control timeout
        if let Err(e) = self.connection.set_timeout(self.config.control_timeout()) {
            warn!("Could not restore control timeout: {e}");
        }
        result
    }
}

fn authentication_error(response: FtpResponse) -> RaxFtpClientError {
    warn!("Login rejected: {response}");
    RaxFtpClientError::Authentication {
        code: response.code,
        message: response.message,
    }
}

fn transfer_failed(response: FtpResponse) -> RaxFtpClientError {
    RaxFtpClientError::TransferFailed {
        code: response.code,
        message: response.message,
    }
}
