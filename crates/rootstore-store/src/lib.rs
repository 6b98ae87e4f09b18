//! Content-addressed object storage for rootstore.
//!
//! This crate implements a hash-keyed object pool analogous to git's
//! `.git/objects/` directory, shared by every repository in a library.
//! Objects are commits, trees, blobs and tags in git's canonical encoding,
//! identified by the SHA-1 of `"<kind> <len>\0" ++ bytes`.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- directory listing mapping names to object hashes
//! - [`Commit`] -- root tree, parents and authorship
//! - [`Tag`] -- annotated tag pointing at another object
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//! - [`DiskContentStore`] -- compressed loose objects under a directory
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. The store has no notion of repositories; scoping happens above it.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. The store never interprets object contents on `put`.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod commit;
pub mod disk;
pub mod error;
pub mod memory;
pub mod object;
pub mod traits;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use commit::{Commit, Signature, Tag};
pub use disk::DiskContentStore;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryContentStore;
pub use object::{Blob, Object, ObjectKind, StoredObject};
pub use traits::{ContentStore, ObjectIter};
pub use tree::{EntryMode, Tree, TreeEntry};
