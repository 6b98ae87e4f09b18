//! Foundation types for rootstore.
//!
//! Every other rootstore crate depends on `rootstore-types`. The types here
//! carry no storage behavior of their own.
//!
//! # Key Types
//!
//! - [`ObjectHash`] — git-compatible SHA-1 object identifier
//! - [`RepositoryId`] — name of one logical repository inside a shared pool

pub mod error;
pub mod object;
pub mod repository;

pub use error::TypeError;
pub use object::{ObjectHash, HASH_LEN};
pub use repository::RepositoryId;
