//! In-memory reference table for testing and ephemeral use.
//!
//! [`InMemoryReferenceTable`] keeps every repository's references behind a
//! single `RwLock`. Data is lost when the table is dropped.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rootstore_types::RepositoryId;

use crate::error::{RefError, Result};
use crate::table::TableState;
use crate::traits::ReferenceTable;
use crate::types::{Expected, Reference, Target};

/// An in-memory implementation of [`ReferenceTable`].
#[derive(Debug, Default)]
pub struct InMemoryReferenceTable {
    state: RwLock<TableState>,
}

impl InMemoryReferenceTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, TableState>> {
        self.state.read().map_err(|e| RefError::poisoned(e))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, TableState>> {
        self.state.write().map_err(|e| RefError::poisoned(e))
    }
}

impl ReferenceTable for InMemoryReferenceTable {
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
        self.write_state()?.check_and_set(repo, new, expected)
    }

    fn remove(&self, repo: &RepositoryId, name: &str) -> Result<bool> {
        Ok(self.write_state()?.remove(repo, name))
    }

    fn create_repository(&self, repo: &RepositoryId) -> Result<()> {
        self.write_state()?.create_repository(repo)
    }

    fn repositories(&self) -> Result<Vec<RepositoryId>> {
        Ok(self.read_state()?.repositories())
    }

    fn contains_repository(&self, repo: &RepositoryId) -> Result<bool> {
        Ok(self.read_state()?.contains_repository(repo))
    }
}
