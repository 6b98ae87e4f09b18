//! Object hashing for rootstore.
//!
//! Object ids are git object ids: SHA-1 over `"<kind> <len>\0"` followed by
//! the canonical encoding. The header plays the role of a domain tag, so a
//! blob and a tree with identical bytes never share an id.
//!
//! Hashing wraps the `sha1` crate; there is no custom cryptography here.

pub mod hasher;

pub use hasher::ContentHasher;
