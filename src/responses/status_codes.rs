//! FTP status code definitions

// Preliminary codes (1xx)
pub const DATA_CONNECTION_ALREADY_OPEN: u16 = 125;
pub const OPENING_DATA_CONNECTION: u16 = 150;

// Success codes (2xx)
pub const COMMAND_OKAY: u16 = 200;
pub const SERVICE_READY: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const PASSIVE_MODE: u16 = 227;
pub const USER_LOGGED_IN: u16 = 230;
pub const PATHNAME_CREATED: u16 = 257;

// Intermediate codes (3xx)
pub const USER_NAME_OKAY_NEED_PASSWORD: u16 = 331;

// Error codes (4xx, 5xx)
pub const NOT_LOGGED_IN: u16 = 530;
pub const FILE_UNAVAILABLE: u16 = 550;

/// Check if status code indicates a preliminary reply
pub fn is_preliminary(code: u16) -> bool {
    (100..200).contains(&code)
}

/// Check if status code indicates success
pub fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// Check if status code indicates error (leading digit 4 or 5)
pub fn is_error(code: u16) -> bool {
    matches!(code / 100, 4 | 5)
}
