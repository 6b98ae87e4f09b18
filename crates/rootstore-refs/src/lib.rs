//! Reference management for rootstore.
//!
//! Every repository in a library keeps its own set of references (branches,
//! tags, remote-tracking refs, `HEAD`) in one shared table keyed by
//! `(repository id, name)`. The objects those references point at live in
//! the shared content store.
//!
//! # Architecture
//!
//! - A [`ReferenceTable`] holds physical names and offers atomic
//!   compare-and-set per name.
//! - [`ScopedRefs`] binds the table to one repository and translates names
//!   according to a [`Presentation`]: *rooted* passes names through, *flat*
//!   nests them under `refs/remotes/<id>/` so several repositories can be
//!   viewed as remotes of one another.
//! - Symbolic references are resolved with a bounded number of hops.
//!
//! # Modules
//!
//! - [`error`] — Error types for ref operations
//! - [`types`] — Core ref types: [`Reference`], [`Target`], [`Expected`]
//! - [`names`] — Name validation and presentation translation
//! - [`traits`] — The [`ReferenceTable`] trait
//! - [`memory`] — In-memory backend
//! - [`file`] — JSON file backend
//! - [`scoped`] — Per-repository view

pub mod error;
pub mod file;
pub mod memory;
pub mod names;
pub mod scoped;
pub mod traits;
pub mod types;

mod table;

pub use error::{RefError, Result};
pub use file::FileReferenceTable;
pub use memory::InMemoryReferenceTable;
pub use names::validate_ref_name;
pub use scoped::{ScopedRefs, DEFAULT_MAX_SYMBOLIC_DEPTH};
pub use traits::ReferenceTable;
pub use types::{Expected, Presentation, Reference, Target};
