//! File transfer module for the RAX FTP transfer client

pub mod download;
pub mod listing;
pub mod progress;
pub mod tree;
pub mod upload;

// Re-export main functions
pub use download::download_file_with_progress;
pub use listing::{DirectoryEntry, read_directory_listing, split_listing};
pub use progress::{TransferProgress, format_bytes, format_speed};
pub use tree::{
    TransferNode, TransferSummary, TreeWalk, join_remote, remote_basename, remote_parent,
    remote_prefixes,
};
pub use upload::{upload_file_with_progress, validate_upload_file};
