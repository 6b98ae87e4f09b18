//! Error types for reachability computation.

use std::fmt;

use rootstore_store::StoreError;
use rootstore_types::ObjectHash;

/// What pointed at an object the walk could not use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Referrer {
    /// A reference seeded the walk.
    Reference(String),
    /// Another object in the graph.
    Object(ObjectHash),
}

impl fmt::Display for Referrer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(name) => write!(f, "reference {name}"),
            Self::Object(hash) => write!(f, "object {hash}"),
        }
    }
}

/// Errors that can occur while computing a reachability set.
#[derive(Debug, thiserror::Error)]
pub enum ReachError {
    /// The object graph is broken: an object is missing or undecodable.
    #[error("corrupt graph: {object} (referenced by {referrer}): {reason}")]
    CorruptGraph {
        /// The object that could not be used.
        object: ObjectHash,
        /// Who pointed at it.
        referrer: Referrer,
        /// Why it could not be used.
        reason: String,
    },

    /// The content store failed for a reason other than a missing object.
    #[error("store error: {0}")]
    Store(StoreError),
}

/// Convenience alias for reachability results.
pub type ReachResult<T> = Result<T, ReachError>;
