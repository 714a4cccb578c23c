//! Terminal module for the RAX FTP transfer client
//!
//! Handles user interaction and coordinates between parser and client.

use log::{debug, error, info};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::client::RaxFtpClient;
use crate::commands::{UserCommand, get_help_text, parse_command};
use crate::error::Result;
use crate::terminal::listing::format_directory_listing;

/// Terminal handler for interactive FTP sessions
pub struct Terminal {
    client: RaxFtpClient,
}

impl Terminal {
    /// Create a new terminal around a logged-in client
    pub fn new(client: RaxFtpClient) -> Self {
        info!(
            "Creating terminal session for server: {}",
            client.config().display_name()
        );

        Self { client }
    }

    /// Run the interactive FTP session until QUIT or end of input
    pub fn run_interactive(&mut self) -> Result<()> {
        println!("RAX FTP Transfer - Interactive Session");
        println!("Connected to: {}", self.client.config().display_name());
        println!("Type 'HELP' for available commands or 'QUIT' to exit");
        println!();

        let stdin = io::stdin();
        loop {
            print!("rax-ftp ({})> ", self.client.state());
            io::stdout().flush()?;

            let mut input = String::new();
            match stdin.read_line(&mut input) {
                Ok(0) => break, // EOF
                Ok(_) => {
                    let command = input.trim();
                    if command.is_empty() {
                        continue;
                    }

                    debug!("User entered command: {}", command);
                    if !self.handle_command(parse_command(command)) {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read input: {}", e);
                    return Err(e.into());
                }
            }
        }

        println!("Closing session...");
        self.client.close()
    }

    /// Run a single command given on the command line, then log out
    pub fn run_once(&mut self, args: &[String]) -> Result<()> {
        let command = parse_command(&args.join(" "));
        let result = self.execute(command);
        self.client.close()?;
        println!("{}", result?);
        Ok(())
    }

    /// Execute one command and print its outcome; returns false to end the session
    fn handle_command(&mut self, command: UserCommand) -> bool {
        if command == UserCommand::Quit {
            println!("Disconnecting from server...");
            return false;
        }

        match self.execute(command) {
            Ok(output) => {
                print!("{}", output);
                if !output.ends_with('\n') {
                    println!();
                }
                true
            }
            Err(e) => {
                println!("Command failed: {}", e);
                if e.is_fatal() {
                    println!("Connection lost. Closing session...");
                    return false;
                }
                true
            }
        }
    }

    fn execute(&mut self, command: UserCommand) -> Result<String> {
        match command {
            UserCommand::Ls { path, recursive } => {
                let entries = self.client.list(&path, recursive)?;
                Ok(format_directory_listing(&entries))
            }
            UserCommand::Nlst(path) => Ok(self.client.name_list(&path)?.join("\n")),
            UserCommand::Get { remote, local } => {
                let target = self.resolve_local(local.as_deref().unwrap_or("."));
                let summary = self.client.download(&remote, &target)?;
                Ok(format!("Downloaded '{remote}': {summary}"))
            }
            UserCommand::Put { local, remote } => {
                let source = self.resolve_local(&local);
                // A directory lands in `<remote>/<dir name>`, so it defaults to the root
                let remote = match remote {
                    Some(remote) => remote,
                    None if source.is_dir() => String::new(),
                    None => source
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                };
                let summary = self.client.upload(&source, &remote)?;
                Ok(format!("Uploaded '{local}': {summary}"))
            }
            UserCommand::Mkd(path) => {
                self.client.make_directories(&path)?;
                Ok(format!("Directory '{path}' ready"))
            }
            UserCommand::Ascii => {
                self.client.set_ascii()?;
                Ok("Transfer type set to ascii".to_string())
            }
            UserCommand::Binary => {
                self.client.set_binary()?;
                Ok("Transfer type set to binary".to_string())
            }
            UserCommand::Status => Ok(format!(
                "Server: {}\nState: {}\nTransfer type: {}\nLocal directory: {}",
                self.client.config().display_name(),
                self.client.state(),
                self.client.transfer_type(),
                self.client.config().local_directory
            )),
            UserCommand::Help => Ok(get_help_text()),
            UserCommand::Quit => Ok("Bye".to_string()),
            UserCommand::Unknown(msg) => Ok(format!("Error: {msg}")),
        }
    }

    /// Relative paths are taken from the configured local directory
    fn resolve_local(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            Path::new(&self.client.config().local_directory).join(path)
        }
    }
}
