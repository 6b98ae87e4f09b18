use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use rootstore_refs::{FileReferenceTable, InMemoryReferenceTable, ReferenceTable};
use rootstore_store::{ContentStore, DiskContentStore, InMemoryContentStore};
use rootstore_types::RepositoryId;

use crate::error::{RepoError, RepoResult};
use crate::lock::{LockRegistry, WriteLock};
use crate::options::LibraryOptions;
use crate::repository::{Mode, Repository};

/// File name of the reference table inside a library directory.
pub const REFS_FILE: &str = "refs.json";

/// A collection of rooted repositories over one shared object pool.
///
/// The library owns the shared backends and the write-lock registry. Two
/// libraries may share the same backends (for example with different
/// presentation modes); each keeps its own lock registry.
pub struct Library {
    store: Arc<dyn ContentStore>,
    refs: Arc<dyn ReferenceTable>,
    options: LibraryOptions,
    locks: Arc<LockRegistry>,
}

impl Library {
    pub fn new(
        store: Arc<dyn ContentStore>,
        refs: Arc<dyn ReferenceTable>,
        options: LibraryOptions,
    ) -> Self {
        Self {
            store,
            refs,
            options,
            locks: Arc::new(LockRegistry::new()),
        }
    }

    /// A library over fresh in-memory backends.
    pub fn in_memory(options: LibraryOptions) -> Self {
        Self::new(
            Arc::new(InMemoryContentStore::new()),
            Arc::new(InMemoryReferenceTable::new()),
            options,
        )
    }

    /// A library persisted under `path`: loose objects in `objects/` and
    /// the reference table in `refs.json`.
    pub fn open_dir(path: impl AsRef<Path>, options: LibraryOptions) -> RepoResult<Self> {
        let path = path.as_ref();
        let store = DiskContentStore::open(path)?;
        let refs = FileReferenceTable::open(path.join(REFS_FILE))?;
        info!(path = %path.display(), presentation = ?options.presentation, "opened library directory");
        Ok(Self::new(Arc::new(store), Arc::new(refs), options))
    }

    pub fn options(&self) -> &LibraryOptions {
        &self.options
    }

    /// The shared content store.
    pub fn content_store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// The shared reference table.
    pub fn reference_table(&self) -> &Arc<dyn ReferenceTable> {
        &self.refs
    }

    /// Open an existing repository.
    ///
    /// Write mode takes the repository's write lock according to the
    /// configured [`LockPolicy`](crate::LockPolicy).
    pub fn open(&self, id: &RepositoryId, mode: Mode) -> RepoResult<Repository> {
        if !self.refs.contains_repository(id)? {
            return Err(RepoError::RepositoryNotFound(id.clone()));
        }
        let lock = match mode {
            Mode::ReadWrite => Some(self.locks.acquire(id, self.options.lock_policy)?),
            Mode::ReadOnly => None,
        };
        debug!(repo = %id, ?mode, "repository opened");
        Ok(self.handle(id, mode, lock))
    }

    /// Alias of [`open`](Self::open).
    pub fn get(&self, id: &RepositoryId, mode: Mode) -> RepoResult<Repository> {
        self.open(id, mode)
    }

    /// Create an empty repository and open it for writing.
    pub fn init(&self, id: &RepositoryId) -> RepoResult<Repository> {
        let lock = self.locks.acquire(id, self.options.lock_policy)?;
        self.refs.create_repository(id)?;
        info!(repo = %id, "repository initialized");
        Ok(self.handle(id, Mode::ReadWrite, Some(lock)))
    }

    fn handle(
        &self,
        id: &RepositoryId,
        mode: Mode,
        lock: Option<WriteLock>,
    ) -> Repository {
        Repository::new(
            id.clone(),
            mode,
            Arc::clone(&self.store),
            Arc::clone(&self.refs),
            &self.options,
            lock,
        )
    }

    /// All repository ids, sorted.
    pub fn repositories(&self) -> RepoResult<Vec<RepositoryId>> {
        Ok(self.refs.repositories()?)
    }

    pub fn has(&self, id: &RepositoryId) -> RepoResult<bool> {
        Ok(self.refs.contains_repository(id)?)
    }

    /// Whether a handle of this library holds the write lock for `id`.
    pub fn is_locked(&self, id: &RepositoryId) -> bool {
        self.locks.is_locked(id)
    }
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
