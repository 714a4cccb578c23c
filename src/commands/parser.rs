//! Shell command parsing functionality

/// A line typed at the interactive prompt (or given on the command line)
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    Ls { path: String, recursive: bool },
    Nlst(String),
    Get { remote: String, local: Option<String> },
    Put { local: String, remote: Option<String> },
    Mkd(String),
    Ascii,
    Binary,
    Status,
    Help,
    Quit,
    Unknown(String),
}

/// Parse user input into a UserCommand
pub fn parse_command(input: &str) -> UserCommand {
    let mut parts = input.split_whitespace();
    let Some(cmd) = parts.next() else {
        return UserCommand::Unknown("Empty command".to_string());
    };
    let args: Vec<&str> = parts.collect();

    match cmd.to_uppercase().as_str() {
        "LS" | "LIST" | "DIR" => {
            let recursive = args.first().is_some_and(|a| *a == "-R" || *a == "-r");
            let path = if recursive { args.get(1) } else { args.first() };
            UserCommand::Ls {
                path: path.copied().unwrap_or_default().to_string(),
                recursive,
            }
        }
        "NLST" => UserCommand::Nlst(args.first().copied().unwrap_or_default().to_string()),
        "GET" | "RETR" => match args.as_slice() {
            [remote] => UserCommand::Get {
                remote: remote.to_string(),
                local: None,
            },
            [remote, local] => UserCommand::Get {
                remote: remote.to_string(),
                local: Some(local.to_string()),
            },
            _ => UserCommand::Unknown("GET requires <remote> [local dir]".to_string()),
        },
        "PUT" | "STOR" => match args.as_slice() {
            [local] => UserCommand::Put {
                local: local.to_string(),
                remote: None,
            },
            [local, remote] => UserCommand::Put {
                local: local.to_string(),
                remote: Some(remote.to_string()),
            },
            _ => UserCommand::Unknown("PUT requires <local> [remote]".to_string()),
        },
        "MKD" | "MKDIR" => match args.as_slice() {
            [path] => UserCommand::Mkd(path.to_string()),
            _ => UserCommand::Unknown("MKD requires directory name".to_string()),
        },
        "ASCII" => UserCommand::Ascii,
        "BINARY" | "IMAGE" => UserCommand::Binary,
        "STATUS" => UserCommand::Status,
        "HELP" | "?" => UserCommand::Help,
        "QUIT" | "EXIT" | "BYE" => UserCommand::Quit,
        other => UserCommand::Unknown(format!("Unknown command: {other}")),
    }
}
