//! State store load and atomic save.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::{debug, warn};

use super::fsync::{fsync_dir, fsync_file};
use super::model::{StoredEntry, StoredState};
use crate::entry::LogEntry;
use crate::error::{Error, Result};

/// Pending entries bound to a JSON file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    filepath: PathBuf,
    /// Pending entries in send order.
    pub buffer: Vec<LogEntry>,
}

impl StateStore {
    /// Creates an empty store for `filepath` without touching the disk.
    #[must_use]
    pub fn new(filepath: impl Into<PathBuf>) -> Self {
        Self {
            filepath: filepath.into(),
            buffer: Vec::new(),
        }
    }

    /// Loads the store at `filepath`, creating it when absent.
    ///
    /// A missing file yields an empty store that is saved immediately,
    /// parent directories included. The `filepath` recorded inside an
    /// existing file is ignored in favour of the path given here.
    ///
    /// # Errors
    ///
    /// - [`Error::Corrupt`] if the file is not a valid state document
    /// - [`Error::Validation`] if an entry has an unknown level name
    /// - [`Error::Io`] if the file cannot be read or created
    pub fn load(filepath: impl AsRef<Path>) -> Result<Self> {
        let filepath = filepath.as_ref();

        let bytes = match fs::read(filepath) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %filepath.display(), "State file absent, creating it");
                let store = Self::new(filepath);
                store.save()?;
                return Ok(store);
            }
            Err(e) => return Err(e.into()),
        };

        let stored: StoredState =
            serde_json::from_slice(&bytes).map_err(|source| Error::Corrupt {
                path: filepath.to_path_buf(),
                source,
            })?;

        if Path::new(&stored.filepath) != filepath {
            warn!(
                recorded = %stored.filepath,
                path = %filepath.display(),
                "State file records a different path; using the path it was loaded from"
            );
        }

        let buffer = stored
            .buffer
            .into_iter()
            .map(LogEntry::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(path = %filepath.display(), entries = buffer.len(), "Loaded state");
        Ok(Self {
            filepath: filepath.to_path_buf(),
            buffer,
        })
    }

    /// Writes the store to its file, replacing the previous content atomically.
    ///
    /// The document is written to `<path>.tmp`, synced, renamed over the
    /// target, and the parent directory is synced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if any step fails. The in-memory buffer is left
    /// untouched either way.
    pub fn save(&self) -> Result<()> {
        let parent = self.filepath.parent().unwrap_or_else(|| Path::new(""));
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }

        let bytes = self.to_json()?;
        let tmp_path = self.tmp_path();
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp_path)?;
            file.write_all(&bytes)?;
            fsync_file(&file)?;
        }

        fs::rename(&tmp_path, &self.filepath)?;
        fsync_dir(parent)?;

        debug!(path = %self.filepath.display(), entries = self.buffer.len(), "Saved state");
        Ok(())
    }

    /// Returns the on-disk representation of this store.
    #[must_use]
    pub fn to_stored(&self) -> StoredState {
        StoredState {
            filepath: self.filepath.to_string_lossy().into_owned(),
            buffer: self.buffer.iter().map(StoredEntry::from).collect(),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.filepath
    }

    /// Pending entries in send order.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.buffer
    }

    fn to_json(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
        self.to_stored()
            .serialize(&mut serializer)
            .map_err(io::Error::other)?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.filepath.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}
