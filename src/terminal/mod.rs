//! Terminal module for the RAX FTP transfer client
//!
//! This module handles all CLI display and user interaction functionality.

pub mod listing;
pub mod session;

// Re-export commonly used items
pub use session::Terminal;
