//! Recursive directory transfers
//!
//! Both directions walk a tree depth-first from an explicit work stack rather
//! than through call-stack recursion, so depth is bounded in one place.

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crate::client::RaxFtpClient;
use crate::error::{RaxFtpClientError, Result};

/// Deepest directory nesting a walk will follow
pub const MAX_TREE_DEPTH: usize = 64;

/// A pending unit of work in a tree walk
#[derive(Debug, Clone, PartialEq)]
pub enum TransferNode {
    File { local: PathBuf, remote: String },
    Directory { local: PathBuf, remote: String },
}

/// Totals for one upload or download call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub files: usize,
    /// Directories created on the receiving side, the root included
    pub directories: usize,
    pub bytes: u64,
}

impl TransferSummary {
    fn single_file(bytes: u64) -> Self {
        Self {
            files: 1,
            directories: 0,
            bytes,
        }
    }
}

impl std::fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} file(s), {} director{}, {}",
            self.files,
            self.directories,
            if self.directories == 1 { "y" } else { "ies" },
            crate::transfer::format_bytes(self.bytes)
        )
    }
}

/// Traversal context owned by a single walk
pub struct TreeWalk {
    stack: Vec<(TransferNode, usize)>,
    summary: TransferSummary,
}

impl TreeWalk {
    pub fn new(root: TransferNode) -> Self {
        Self {
            stack: vec![(root, 0)],
            summary: TransferSummary::default(),
        }
    }

    /// Queue the children of a node at `depth`; they are visited in the given order
    pub fn push_children(&mut self, children: Vec<TransferNode>, depth: usize) -> Result<()> {
        if depth >= MAX_TREE_DEPTH && !children.is_empty() {
            return Err(RaxFtpClientError::Protocol(format!(
                "directory tree is deeper than {MAX_TREE_DEPTH} levels"
            )));
        }
        self.stack
            .extend(children.into_iter().rev().map(|node| (node, depth + 1)));
        Ok(())
    }

    pub fn next_node(&mut self) -> Option<(TransferNode, usize)> {
        self.stack.pop()
    }

    pub fn summary(&self) -> TransferSummary {
        self.summary
    }
}

/// Join a remote directory and an entry name with '/'
pub fn join_remote(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else if base.ends_with('/') {
        format!("{base}{name}")
    } else {
        format!("{base}/{name}")
    }
}

/// Parent directory of a remote path, if it has one worth creating
pub fn remote_parent(path: &str) -> Option<&str> {
    let path = path.trim_end_matches('/');
    let (parent, _) = path.rsplit_once('/')?;
    if parent.is_empty() || parent == "." {
        None
    } else {
        Some(parent)
    }
}

/// Every prefix of a remote path: "a/b/c" gives "a", "a/b", "a/b/c"
pub fn remote_prefixes(path: &str) -> Vec<String> {
    let mut current = if path.starts_with('/') {
        "/".to_string()
    } else {
        String::new()
    };

    let mut prefixes = Vec::new();
    for component in path.split('/').filter(|c| !c.is_empty() && *c != ".") {
        current = join_remote(&current, component);
        prefixes.push(current.clone());
    }
    prefixes
}

/// Last component of a remote path
pub fn remote_basename(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

fn local_basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

impl RaxFtpClient {
    /// Upload a file, or a directory tree into `remote/<local dir name>`
    pub fn upload(&mut self, local: &Path, remote: &str) -> Result<TransferSummary> {
        self.ensure_ready()?;

        if local.is_dir() {
            let remote_dir = join_remote(remote, &local_basename(local));
            self.make_directories(&remote_dir)?;
            self.upload_directory(local, &remote_dir)
        } else {
            let bytes = self.upload_file(local, remote)?;
            Ok(TransferSummary::single_file(bytes))
        }
    }

    /// Mirror a local directory tree into `remote`
    pub fn upload_directory(&mut self, local: &Path, remote: &str) -> Result<TransferSummary> {
        self.ensure_ready()?;
        if !local.is_dir() {
            return Err(RaxFtpClientError::LocalFileNotFound(local.to_path_buf()));
        }

        let mut walk = TreeWalk::new(TransferNode::Directory {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        });

        while let Some((node, depth)) = walk.next_node() {
            match node {
                TransferNode::Directory { local, remote } => {
                    self.make_directory(&remote)?;
                    walk.summary.directories += 1;
                    walk.push_children(local_children(&local, &remote)?, depth)?;
                }
                TransferNode::File { local, remote } => {
                    walk.summary.bytes += self.send_file(&local, &remote)?;
                    walk.summary.files += 1;
                }
            }
        }

        info!("Uploaded '{}': {}", local.display(), walk.summary());
        Ok(walk.summary())
    }

    /// Download a remote file or directory into the local directory `local`.
    ///
    /// One LIST call decides what `remote` is: a single non-directory entry
    /// carrying the target's own name is a file, anything else a directory.
    /// A directory holding one file of its own name (`logs/logs`) lists the
    /// same way, so a refused RETR falls back to a directory download.
    pub fn download(&mut self, remote: &str, local: &Path) -> Result<TransferSummary> {
        self.ensure_ready()?;

        let entries = self.list(remote, false)?;
        let name = remote_basename(remote);
        let target = local.join(name);

        match entries.as_slice() {
            [] => Err(RaxFtpClientError::RemoteNotFound(remote.to_string())),
            [entry] if !entry.is_directory && remote_basename(&entry.name) == name => {
                match self.download_file(remote, &target) {
                    Ok(bytes) => Ok(TransferSummary::single_file(bytes)),
                    Err(RaxFtpClientError::RemoteFileNotFound { code, message, .. }) => {
                        debug!("RETR '{remote}' refused ({code} {message}); treating it as a directory");
                        self.download_directory(remote, &target)
                    }
                    Err(e) => Err(e),
                }
            }
            _ => self.download_directory(remote, &target),
        }
    }

    /// Mirror a remote directory tree into `local`
    pub fn download_directory(&mut self, remote: &str, local: &Path) -> Result<TransferSummary> {
        self.ensure_ready()?;

        let mut walk = TreeWalk::new(TransferNode::Directory {
            local: local.to_path_buf(),
            remote: remote.to_string(),
        });

        while let Some((node, depth)) = walk.next_node() {
            match node {
                TransferNode::Directory { local, remote } => {
                    fs::create_dir_all(&local)?;
                    walk.summary.directories += 1;

                    let children = self
                        .list(&remote, false)?
                        .into_iter()
                        .filter(|entry| !entry.is_navigation())
                        .map(|entry| {
                            let child_remote = join_remote(&remote, &entry.name);
                            let child_local = local.join(&entry.name);
                            if entry.is_directory {
                                TransferNode::Directory {
                                    local: child_local,
                                    remote: child_remote,
                                }
                            } else {
                                TransferNode::File {
                                    local: child_local,
                                    remote: child_remote,
                                }
                            }
                        })
                        .collect();
                    walk.push_children(children, depth)?;
                }
                TransferNode::File { local, remote } => {
                    walk.summary.bytes += self.download_file(&remote, &local)?;
                    walk.summary.files += 1;
                }
            }
        }

        info!("Downloaded '{remote}': {}", walk.summary());
        Ok(walk.summary())
    }

    /// Run [`RaxFtpClient::download`] on a worker thread.
    ///
    /// The session moves onto the worker and is handed back with the result,
    /// so its control channel is never shared while the walk is running.
    pub fn download_detached(
        self,
        remote: &str,
        local: &Path,
    ) -> thread::JoinHandle<(RaxFtpClient, Result<TransferSummary>)> {
        let remote = remote.to_string();
        let local = local.to_path_buf();
        thread::spawn(move || {
            let mut client = self;
            let result = client.download(&remote, &local);
            (client, result)
        })
    }
}

/// Local directory entries as work items, sorted by name
fn local_children(local: &Path, remote: &str) -> Result<Vec<TransferNode>> {
    let mut entries = fs::read_dir(local)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut children = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_local = entry.path();
        let child_remote = join_remote(remote, &name);
        if entry.file_type()?.is_dir() {
            children.push(TransferNode::Directory {
                local: child_local,
                remote: child_remote,
            });
        } else {
            children.push(TransferNode::File {
                local: child_local,
                remote: child_remote,
            });
        }
    }
    debug!("Queued {} entries from '{}'", children.len(), local.display());
    Ok(children)
}
