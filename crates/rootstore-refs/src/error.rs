//! Error types for reference operations.

use rootstore_types::{RepositoryId, TypeError};
use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference was not found.
    #[error("reference not found: {name}")]
    NotFound { name: String },

    /// A compare-and-set found a value other than the expected one.
    #[error("reference {name} changed concurrently: expected {expected}, found {actual}")]
    CasMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Symbolic resolution exceeded the hop bound.
    #[error("symbolic reference {name} did not resolve within {depth} hops")]
    Cycle { name: String, depth: usize },

    /// The reference name is invalid.
    #[error("invalid reference name: {name}: {reason}")]
    InvalidName { name: String, reason: String },

    /// The repository id is invalid.
    #[error(transparent)]
    InvalidRepositoryId(#[from] TypeError),

    /// A repository with this id is already registered.
    #[error("repository already exists: {0}")]
    RepositoryExists(RepositoryId),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RefError {
    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn poisoned(e: impl std::fmt::Display) -> Self {
        Self::Io(std::io::Error::other(format!("lock poisoned: {e}")))
    }
}

/// Convenience alias for `Result<T, RefError>`.
pub type Result<T> = std::result::Result<T, RefError>;
