//! File-backed reference table.
//!
//! The whole table is one JSON document. Every mutation is applied to a
//! copy of the in-memory state, written to a temp file beside the target and
//! renamed over it; only then does the copy replace the live state. A failed
//! write therefore leaves both the file and the table unchanged.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use rootstore_types::RepositoryId;

use crate::error::{RefError, Result};
use crate::table::TableState;
use crate::traits::ReferenceTable;
use crate::types::{Expected, Reference, Target};

/// A [`ReferenceTable`] persisted to a JSON file.
#[derive(Debug)]
pub struct FileReferenceTable {
    path: PathBuf,
    state: RwLock<TableState>,
}

impl FileReferenceTable {
    /// Open the table stored at `path`, starting empty if the file does not
    /// exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| RefError::Serialization(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == ErrorKind::NotFound => TableState::default(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), "opened reference table");
        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, TableState>> {
        self.state.read().map_err(|e| RefError::poisoned(e))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, TableState>> {
        self.state.write().map_err(|e| RefError::poisoned(e))
    }

    fn persist(&self, state: &TableState) -> Result<()> {
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| RefError::Serialization(e.to_string()))?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| RefError::Io(e.error))?;
        Ok(())
    }

    /// Run `f` against a copy of the state and commit it only if both `f`
    /// and the write to disk succeed.
    fn mutate<T>(&self, f: impl FnOnce(&mut TableState) -> Result<T>) -> Result<T> {
        let mut guard = self.write_state()?;
        let mut next = guard.clone();
        let out = f(&mut next)?;
        if next != *guard {
            self.persist(&next)?;
            *guard = next;
        }
        Ok(out)
    }
}

impl ReferenceTable for FileReferenceTable {
    fn read(&self, repo: &RepositoryId, name: &str) -> Result<Option<Target>> {
        Ok(self.read_state()?.read(repo, name))
    }

    fn list(&self, repo: &RepositoryId) -> Result<Vec<Reference>> {
        Ok(self.read_state()?.list(repo))
    }

    fn check_and_set(
        &self,
        repo: &RepositoryId,
        new: &Reference,
        expected: &Expected,
    ) -> Result<()> {
        self.mutate(|state| state.check_and_set(repo, new, expected))
    }

    fn remove(&self, repo: &RepositoryId, name: &str) -> Result<bool> {
        self.mutate(|state| Ok(state.remove(repo, name)))
    }

    fn create_repository(&self, repo: &RepositoryId) -> Result<()> {
        self.mutate(|state| state.create_repository(repo))
    }

    fn repositories(&self) -> Result<Vec<RepositoryId>> {
        Ok(self.read_state()?.repositories())
    }

    fn contains_repository(&self, repo: &RepositoryId) -> Result<bool> {
        Ok(self.read_state()?.contains_repository(repo))
    }
}
