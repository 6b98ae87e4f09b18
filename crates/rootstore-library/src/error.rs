use thiserror::Error;

use rootstore_reach::{ReachError, Referrer};
use rootstore_refs::RefError;
use rootstore_store::StoreError;
use rootstore_types::{ObjectHash, RepositoryId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("object not found: {0}")]
    ObjectNotFound(ObjectHash),

    #[error("reference not found: {0}")]
    ReferenceNotFound(String),

    #[error("reference {name} has changed: expected {expected}, found {actual}")]
    ReferenceCasMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("reference {name} does not resolve within {depth} symbolic hops")]
    ReferenceCycle { name: String, depth: usize },

    #[error("corrupt object graph at {object} (referenced by {referrer}): {reason}")]
    CorruptGraph {
        object: ObjectHash,
        referrer: Referrer,
        reason: String,
    },

    #[error("repository is locked for writing: {0}")]
    RepositoryLocked(RepositoryId),

    #[error("repository not found: {0}")]
    RepositoryNotFound(RepositoryId),

    #[error("repository already exists: {0}")]
    RepositoryExists(RepositoryId),

    #[error("repository handle is closed: {0}")]
    HandleClosed(RepositoryId),

    #[error("repository is open read-only: {0}")]
    ReadOnly(RepositoryId),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("ref error: {0}")]
    Ref(RefError),

    #[error("configuration error: {0}")]
    Config(String),
}

impl RepoError {
    /// Returns `true` when the underlying data can no longer be trusted or
    /// reached, as opposed to a failure the caller can act on.
    ///
    /// Reference-table I/O and an unreadable table file count as fatal just
    /// like content store failures.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CorruptGraph { .. }
                | Self::Store(_)
                | Self::Ref(RefError::Io(_) | RefError::Serialization(_))
        )
    }
}

impl From<StoreError> for RepoError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(hash) => Self::ObjectNotFound(hash),
            other => Self::Store(other),
        }
    }
}

impl From<RefError> for RepoError {
    fn from(e: RefError) -> Self {
        match e {
            RefError::NotFound { name } => Self::ReferenceNotFound(name),
            RefError::CasMismatch {
                name,
                expected,
                actual,
            } => Self::ReferenceCasMismatch {
                name,
                expected,
                actual,
            },
            RefError::Cycle { name, depth } => Self::ReferenceCycle { name, depth },
            RefError::RepositoryExists(id) => Self::RepositoryExists(id),
            other => Self::Ref(other),
        }
    }
}

impl From<ReachError> for RepoError {
    fn from(e: ReachError) -> Self {
        match e {
            ReachError::CorruptGraph {
                object,
                referrer,
                reason,
            } => Self::CorruptGraph {
                object,
                referrer,
                reason,
            },
            ReachError::Store(e) => Self::Store(e),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
