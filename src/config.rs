use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::time::Duration;

use crate::error::{RaxFtpClientError, Result};

/// Name of the optional TOML file read from the working directory
const CONFIG_FILE: &str = "rax-ftp-transfer";

/// Prefix for environment variable overrides, e.g. `RAX_FTP_HOST`
const ENV_PREFIX: &str = "RAX_FTP";

/// Configuration for the RAX FTP transfer client
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// FTP server hostname or IP address
    pub host: String,

    /// Control connection port
    pub port: u16,

    /// Login name
    pub username: String,

    /// Login password
    pub password: String,

    /// Control channel timeout in seconds
    pub timeout: u64,

    /// Timeout in seconds while a file transfer is in progress
    pub transfer_timeout: u64,

    /// Chunk size used for data connection reads and writes
    pub buffer_size: usize,

    /// Local directory that relative download targets resolve against
    pub local_directory: String,
}

impl ClientConfig {
    /// Load defaults, then `rax-ftp-transfer.toml` if present, then `RAX_FTP_*` variables
    pub fn load() -> Result<Self> {
        let settings = Self::builder()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML document layered over the defaults
    pub fn from_toml(document: &str) -> Result<Self> {
        let settings = Self::builder()?
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?;

        let config: ClientConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();
        Ok(Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("username", defaults.username)?
            .set_default("password", defaults.password)?
            .set_default("timeout", defaults.timeout as i64)?
            .set_default("transfer_timeout", defaults.transfer_timeout as i64)?
            .set_default("buffer_size", defaults.buffer_size as i64)?
            .set_default("local_directory", defaults.local_directory)?)
    }

    pub fn control_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn transfer_timeout(&self) -> Duration {
        Duration::from_secs(self.transfer_timeout)
    }

    /// Get display name for the server
    pub fn display_name(&self) -> String {
        format!("{}@{}:{}", self.username, self.host, self.port)
    }

    /// Validate the basic configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(RaxFtpClientError::InvalidConfigValue(
                "Host cannot be empty".to_string(),
            ));
        }

        if self.port == 0 {
            return Err(RaxFtpClientError::InvalidConfigValue(
                "Port cannot be 0".to_string(),
            ));
        }

        if self.timeout == 0 || self.transfer_timeout == 0 {
            return Err(RaxFtpClientError::InvalidConfigValue(
                "Timeouts cannot be 0".to_string(),
            ));
        }

        if self.buffer_size == 0 {
            return Err(RaxFtpClientError::InvalidConfigValue(
                "Buffer size cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 21,
            username: "anonymous".to_string(),
            password: "anonymous@".to_string(),
            timeout: 20,
            transfer_timeout: 120,
            buffer_size: 8192,
            local_directory: ".".to_string(),
        }
    }
}

impl std::fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RAX FTP Config - Server: {}, Timeout: {}s, Transfer Timeout: {}s, Buffer: {} bytes, Local Dir: {}",
            self.display_name(),
            self.timeout,
            self.transfer_timeout,
            self.buffer_size,
            self.local_directory
        )
    }
}
