use rootstore_types::ObjectHash;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectHash),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch {
        expected: ObjectHash,
        computed: ObjectHash,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectHash, reason: String },

    /// Compression or decompression of a stored payload failed.
    #[error("compression error: {0}")]
    Compression(String),
}

impl StoreError {
    /// Returns `true` for errors that mean the stored bytes cannot be
    /// trusted, as opposed to a plain miss.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::HashMismatch { .. } | Self::CorruptObject { .. } | Self::Compression(_)
        )
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
