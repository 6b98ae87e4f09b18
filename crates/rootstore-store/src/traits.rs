use rootstore_types::ObjectHash;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};

/// Lazy sequence of `(hash, object)` pairs produced by [`ContentStore::iter_all`].
pub type ObjectIter<'a> = Box<dyn Iterator<Item = StoreResult<(ObjectHash, StoredObject)>> + Send + 'a>;

/// Content-addressed, append-only object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees this:
///   the same kind and bytes always produce the same hash.
/// - `put` of an object that is already present is a no-op.
/// - A failed `put` leaves the store unchanged.
/// - Concurrent reads and writes are safe; concurrent puts of identical
///   content race harmlessly.
/// - The store has no notion of repositories. Scoping objects to a
///   repository is done above this layer.
/// - All I/O errors are propagated, never silently ignored.
pub trait ContentStore: Send + Sync {
    /// Store an object and return its content-addressed hash.
    fn put(&self, object: &StoredObject) -> StoreResult<ObjectHash>;

    /// Read an object by hash.
    ///
    /// Returns `Err(StoreError::NotFound)` if the object does not exist.
    fn get(&self, hash: &ObjectHash) -> StoreResult<StoredObject>;

    /// Check whether an object exists in the store.
    fn has(&self, hash: &ObjectHash) -> StoreResult<bool>;

    /// Enumerate every stored object of `kind`, in hash order.
    ///
    /// The sequence is finite and reflects the store at call time; call
    /// again to restart it.
    fn iter_all(&self, kind: ObjectKind) -> StoreResult<ObjectIter<'_>>;

    /// Read an object if present, mapping a miss to `None`.
    fn try_get(&self, hash: &ObjectHash) -> StoreResult<Option<StoredObject>> {
        match self.get(hash) {
            Ok(obj) => Ok(Some(obj)),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read multiple objects in a batch.
    ///
    /// Default implementation calls `try_get()` for each hash.
    fn get_batch(&self, hashes: &[ObjectHash]) -> StoreResult<Vec<Option<StoredObject>>> {
        hashes.iter().map(|h| self.try_get(h)).collect()
    }

    /// Write multiple objects in a batch and return their hashes.
    ///
    /// Default implementation calls `put()` for each object.
    fn put_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectHash>> {
        objects.iter().map(|obj| self.put(obj)).collect()
    }
}
