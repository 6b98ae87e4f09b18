//! Many rooted repositories over one shared object pool.
//!
//! A [`Library`] hands out [`Repository`] handles. Each handle lists its own
//! references (rooted or flat, per [`LibraryOptions::presentation`]) and
//! sees only the objects reachable from them, even though every repository
//! stores its objects in the same content store.
//!
//! ```
//! use rootstore_library::{Blob, Library, LibraryOptions, Object, Reference, RepositoryId};
//!
//! let library = Library::in_memory(LibraryOptions::rooted());
//! let id = RepositoryId::new("gitserver.com/a").unwrap();
//! let repo = library.init(&id).unwrap();
//!
//! let hash = repo
//!     .new_encoded_object(&Object::Blob(Blob::new(b"hello world\n".to_vec())))
//!     .unwrap();
//! repo.set_reference(&Reference::hash("refs/heads/master", hash)).unwrap();
//!
//! assert_eq!(repo.reference("refs/heads/master", false).unwrap().target.hash(), Some(hash));
//! assert!(repo.has_object(&hash).unwrap());
//! ```

pub mod error;
pub mod library;
pub mod lock;
pub mod options;
pub mod repository;

#[cfg(test)]
mod fixtures;

pub use error::{RepoError, RepoResult};
pub use library::{Library, REFS_FILE};
pub use lock::{LockRegistry, WriteLock};
pub use options::{LibraryOptions, LockPolicy};
pub use repository::{Mode, ObjectIter, ReferenceIter, Repository, TypedIter};

// Re-export key types
pub use rootstore_reach::{ReachabilitySet, Referrer};
pub use rootstore_refs::{Expected, Presentation, Reference, Target};
pub use rootstore_store::{
    Blob, Commit, EntryMode, Object, ObjectKind, Signature, StoredObject, Tag, Tree, TreeEntry,
};
pub use rootstore_types::{ObjectHash, RepositoryId};
