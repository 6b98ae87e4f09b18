//! The [`ReferenceTable`] trait defining the physical reference interface.
//!
//! Any backend (in-memory, file, database) implements this trait. Keys are
//! `(repository, physical name)`; presentation modes are applied above this
//! layer by [`ScopedRefs`](crate::scoped::ScopedRefs).

use rootstore_types::RepositoryId;

use crate::error::Result;
use crate::types::{Expected, Reference, Target};

/// Storage backend for per-repository references.
///
/// Implementations must be thread-safe (`Send + Sync`) and make
/// `check_and_set` atomic per name: a mismatch changes nothing.
pub trait ReferenceTable: Send + Sync {
    /// Read the target of a reference.
    ///
    /// Returns `Ok(None)` if the reference does not exist.
    fn read(&self, repo: &RepositoryId, name: &str) -> Result<Option<Target>>;

    /// List a repository's references.
    ///
    /// Order is `refs/heads/*`, `refs/tags/*`, `refs/remotes/*`, other
    /// `refs/*`, then `HEAD`, keeping insertion order within each group.
    /// Unknown repositories list as empty.
    fn list(&self, repo: &RepositoryId) -> Result<Vec<Reference>>;

    /// Write `new` if the current value satisfies `expected`.
    ///
    /// Fails with [`RefError::CasMismatch`](crate::RefError::CasMismatch)
    /// otherwise. Writing registers the repository if needed.
    fn check_and_set(&self, repo: &RepositoryId, new: &Reference, expected: &Expected)
        -> Result<()>;

    /// Delete a reference.
    ///
    /// Returns `Ok(true)` if it existed, `Ok(false)` otherwise.
    fn remove(&self, repo: &RepositoryId, name: &str) -> Result<bool>;

    /// Register an empty repository.
    fn create_repository(&self, repo: &RepositoryId) -> Result<()>;

    /// All known repository ids, sorted.
    fn repositories(&self) -> Result<Vec<RepositoryId>>;

    /// Returns `true` if the repository is registered.
    fn contains_repository(&self, repo: &RepositoryId) -> Result<bool>;

    /// Unconditional write.
    fn set(&self, repo: &RepositoryId, new: &Reference) -> Result<()> {
        self.check_and_set(repo, new, &Expected::Any)
    }
}
