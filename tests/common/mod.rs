//! In-process FTP server used by the integration tests.
//!
//! It speaks just enough of the protocol for the client: login, TYPE, PASV,
//! LIST/NLST, STOR, RETR, MKD and QUIT, over an in-memory file tree.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rax_ftp_transfer::{ClientConfig, RaxFtpClient};

pub const USER: &str = "tester";
pub const PASSWORD: &str = "secret";

/// Replies the server uses where a test wants to misbehave
#[derive(Clone)]
pub struct Behaviour {
    pub greeting: Vec<String>,
    pub user_reply: String,
    pub refuse_ascii: bool,
    /// Final reply sent after a STOR payload instead of 226
    pub stor_final_reply: Option<String>,
    /// Final reply sent after a RETR payload instead of 226
    pub retr_final_reply: Option<String>,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            greeting: vec!["220 Mock FTP ready".to_string()],
            user_reply: "331 Please specify the password.".to_string(),
            refuse_ascii: false,
            stor_final_reply: None,
            retr_final_reply: None,
        }
    }
}

#[derive(Default)]
pub struct ServerState {
    pub files: BTreeMap<String, Vec<u8>>,
    pub dirs: BTreeSet<String>,
    pub commands: Vec<String>,
}

pub struct MockFtpServer {
    pub port: u16,
    state: Arc<Mutex<ServerState>>,
}

impl MockFtpServer {
    pub fn start() -> Self {
        Self::with_behaviour(Behaviour::default())
    }

    pub fn with_behaviour(behaviour: Behaviour) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(ServerState::default()));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let state = Arc::clone(&shared);
                let behaviour = behaviour.clone();
                thread::spawn(move || {
                    let _ = Session::new(stream, state, behaviour).run();
                });
            }
        });

        Self { port, state }
    }

    pub fn add_dir(&self, path: &str) {
        self.state.lock().unwrap().dirs.insert(normalize(path));
    }

    pub fn add_file(&self, path: &str, contents: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(normalize(path), contents.to_vec());
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(&normalize(path)).cloned()
    }

    pub fn has_dir(&self, path: &str) -> bool {
        self.state.lock().unwrap().dirs.contains(&normalize(path))
    }

    /// Every command line received so far, across all sessions
    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn count_commands(&self, verb: &str) -> usize {
        self.commands()
            .iter()
            .filter(|line| line.split(' ').next() == Some(verb))
            .count()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig {
            host: "127.0.0.1".to_string(),
            port: self.port,
            username: USER.to_string(),
            password: PASSWORD.to_string(),
            timeout: 5,
            transfer_timeout: 10,
            buffer_size: 1024,
            local_directory: ".".to_string(),
        }
    }

    /// A client that is already logged in
    pub fn client(&self) -> RaxFtpClient {
        let mut client = RaxFtpClient::new(self.config());
        client.connect("127.0.0.1", USER, PASSWORD).unwrap();
        client
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/')
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn parent_of(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((parent, _)) => parent.to_string(),
        None => String::new(),
    }
}

fn name_of(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn dir_line(name: &str) -> String {
    format!("drwxr-xr-x    2 ftp      ftp          4096 Jan 01 10:00 {name}")
}

fn file_line(name: &str, size: usize) -> String {
    format!("-rw-r--r--    1 ftp      ftp      {size:>8} Jan 01 10:00 {name}")
}

struct Session {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    state: Arc<Mutex<ServerState>>,
    behaviour: Behaviour,
    passive: Option<TcpListener>,
}

impl Session {
    fn new(stream: TcpStream, state: Arc<Mutex<ServerState>>, behaviour: Behaviour) -> Self {
        stream.set_read_timeout(Some(Duration::from_secs(30))).unwrap();
        Self {
            reader: BufReader::new(stream.try_clone().unwrap()),
            writer: stream,
            state,
            behaviour,
            passive: None,
        }
    }

    fn reply(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(format!("{line}\r\n").as_bytes())
    }

    fn accept_data(&mut self) -> Option<TcpStream> {
        let listener = self.passive.take()?;
        let (stream, _) = listener.accept().ok()?;
        stream.set_read_timeout(Some(Duration::from_secs(30))).ok()?;
        Some(stream)
    }

    fn run(mut self) -> std::io::Result<()> {
        for line in self.behaviour.greeting.clone() {
            self.reply(&line)?;
        }

        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(());
            }
            let line = line.trim_end().to_string();
            self.state.lock().unwrap().commands.push(line.clone());

            let (verb, arg) = match line.split_once(' ') {
                Some((verb, arg)) => (verb.to_uppercase(), arg.to_string()),
                None => (line.to_uppercase(), String::new()),
            };

            match verb.as_str() {
                "USER" => {
                    let reply = self.behaviour.user_reply.clone();
                    self.reply(&reply)?;
                }
                "PASS" if arg == PASSWORD => self.reply("230 Login successful.")?,
                "PASS" => self.reply("530 Login incorrect.")?,
                "TYPE" if arg == "A" && self.behaviour.refuse_ascii => {
                    self.reply("504 Bad TYPE command.")?
                }
                "TYPE" => self.reply("200 Switching mode.")?,
                "PASV" => {
                    let listener = TcpListener::bind("127.0.0.1:0")?;
                    let port = listener.local_addr()?.port();
                    self.passive = Some(listener);
                    // Deliberately bogus address: clients must use the control host
                    self.reply(&format!(
                        "227 Entering Passive Mode (10,255,255,1,{},{}).",
                        port / 256,
                        port % 256
                    ))?;
                }
                "LIST" | "NLST" => self.listing(&verb, &arg)?,
                "STOR" => self.store(&arg)?,
                "RETR" => self.retrieve(&arg)?,
                "MKD" => self.make_directory(&arg)?,
                "QUIT" => {
                    self.reply("221 Goodbye.")?;
                    return Ok(());
                }
                _ => self.reply("502 Command not implemented.")?,
            }
        }
    }

    fn listing(&mut self, verb: &str, arg: &str) -> std::io::Result<()> {
        let recursive = arg.starts_with("-R");
        let raw_path = arg.trim_start_matches("-R").trim();
        let path = normalize(raw_path);

        let lines = {
            let state = self.state.lock().unwrap();
            if let Some(contents) = state.files.get(&path) {
                Some(vec![if verb == "NLST" {
                    raw_path.to_string()
                } else {
                    file_line(raw_path, contents.len())
                }])
            } else if path.is_empty() || state.dirs.contains(&path) {
                let mut lines = Vec::new();
                let prefix = if path.is_empty() {
                    String::new()
                } else {
                    format!("{path}/")
                };
                let direct = |candidate: &String| {
                    candidate.starts_with(&prefix)
                        && (recursive || !candidate[prefix.len()..].contains('/'))
                };
                for dir in state.dirs.iter().filter(|d| direct(*d)) {
                    let name = &dir[prefix.len()..];
                    lines.push(if verb == "NLST" {
                        name.to_string()
                    } else {
                        dir_line(name)
                    });
                }
                for (file, contents) in state.files.iter().filter(|(f, _)| direct(*f)) {
                    let name = &file[prefix.len()..];
                    lines.push(if verb == "NLST" {
                        name.to_string()
                    } else {
                        file_line(name, contents.len())
                    });
                }
                Some(lines)
            } else {
                None
            }
        };

        let Some(lines) = lines else {
            self.passive = None;
            return self.reply("550 No such file or directory.");
        };

        self.reply("150 Here comes the directory listing.")?;
        if let Some(mut data) = self.accept_data() {
            for line in lines {
                data.write_all(format!("{line}\r\n").as_bytes())?;
            }
        }
        self.reply("226 Directory send OK.")
    }

    fn store(&mut self, arg: &str) -> std::io::Result<()> {
        let path = normalize(arg);
        let parent = parent_of(&path);
        let parent_exists = parent.is_empty() || self.state.lock().unwrap().dirs.contains(&parent);
        if !parent_exists {
            self.passive = None;
            return self.reply("553 Could not create file.");
        }

        self.reply("150 Ok to send data.")?;
        let mut payload = Vec::new();
        if let Some(mut data) = self.accept_data() {
            data.read_to_end(&mut payload)?;
        }
        self.state.lock().unwrap().files.insert(path, payload);

        let reply = self
            .behaviour
            .stor_final_reply
            .clone()
            .unwrap_or_else(|| "226 Transfer complete.".to_string());
        self.reply(&reply)
    }

    fn retrieve(&mut self, arg: &str) -> std::io::Result<()> {
        let path = normalize(arg);
        let contents = self.state.lock().unwrap().files.get(&path).cloned();
        let Some(contents) = contents else {
            self.passive = None;
            return self.reply("550 Failed to open file.");
        };

        self.reply(&format!(
            "150 Opening BINARY mode data connection for {} ({} bytes).",
            name_of(&path),
            contents.len()
        ))?;
        if let Some(mut data) = self.accept_data() {
            data.write_all(&contents)?;
        }

        let reply = self
            .behaviour
            .retr_final_reply
            .clone()
            .unwrap_or_else(|| "226 Transfer complete.".to_string());
        self.reply(&reply)
    }

    fn make_directory(&mut self, arg: &str) -> std::io::Result<()> {
        let path = normalize(arg);
        let reply = {
            let mut state = self.state.lock().unwrap();
            let parent = parent_of(&path);
            if path.is_empty() || state.dirs.contains(&path) || state.files.contains_key(&path) {
                "550 Create directory operation failed.".to_string()
            } else if !parent.is_empty() && !state.dirs.contains(&parent) {
                "550 Create directory operation failed.".to_string()
            } else {
                state.dirs.insert(path.clone());
                format!("257 \"/{path}\" created")
            }
        };
        self.reply(&reply)
    }
}
