//! Help text for the interactive shell

/// Returns the help text for all shell commands
pub fn get_help_text() -> String {
    String::from(
        "Available commands:
  LS [-R] [path]            - Long listing of a remote directory (-R recurses)
  NLST [path]               - Bare names in a remote directory
  GET <remote> [local dir]  - Download a file or directory tree
  PUT <local> [remote]      - Upload a file, or a directory tree into <remote>
  MKD <path>                - Create a remote directory (parents included)
  ASCII                     - Switch to ASCII transfers (TYPE A)
  BINARY                    - Switch to binary transfers (TYPE I)
  STATUS                    - Show session state and transfer type
  QUIT                      - Log out and exit
  HELP                      - Show this help message

Relative local paths resolve against the configured local directory.",
    )
}
