//! fsync helpers for atomic state replacement.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Flushes a file's contents and metadata to disk.
pub fn fsync_file(file: &File) -> io::Result<()> {
    file.sync_all()
}

/// Flushes a directory so a rename inside it survives power loss.
///
/// An empty path means the current directory.
#[cfg(unix)]
pub fn fsync_dir(dir_path: &Path) -> io::Result<()> {
    let dir_path = if dir_path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir_path
    };
    OpenOptions::new().read(true).open(dir_path)?.sync_all()
}

/// Directory handles cannot be opened for sync on this platform.
#[cfg(not(unix))]
#[allow(clippy::unnecessary_wraps)]
pub fn fsync_dir(_dir_path: &Path) -> io::Result<()> {
    Ok(())
}
