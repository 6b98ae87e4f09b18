use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use rootstore_types::ObjectHash;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::{ContentStore, ObjectIter};

/// In-memory, HashMap-based content store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Object payloads are reference
/// counted, so reads never copy bytes.
pub struct InMemoryContentStore {
    objects: RwLock<HashMap<ObjectHash, StoredObject>>,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    fn read_map(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<ObjectHash, StoredObject>>> {
        self.objects
            .read()
            .map_err(|e| StoreError::Io(std::io::Error::other(format!("lock poisoned: {e}"))))
    }

    fn write_map(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<ObjectHash, StoredObject>>> {
        self.objects
            .write()
            .map_err(|e| StoreError::Io(std::io::Error::other(format!("lock poisoned: {e}"))))
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.read_map().map(|m| m.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.read_map()
            .map(|m| m.values().map(|obj| obj.size).sum())
            .unwrap_or(0)
    }

    /// Return a sorted list of all object hashes in the store.
    pub fn all_hashes(&self) -> Vec<ObjectHash> {
        let Ok(map) = self.read_map() else {
            return Vec::new();
        };
        let mut hashes: Vec<ObjectHash> = map.keys().copied().collect();
        hashes.sort();
        hashes
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentStore for InMemoryContentStore {
    fn put(&self, object: &StoredObject) -> StoreResult<ObjectHash> {
        let hash = object.hash();
        let mut map = self.write_map()?;
        // Idempotent: if already present, skip (content-addressing guarantees
        // the same hash always maps to the same content).
        map.entry(hash).or_insert_with(|| {
            debug!(hash = %hash.short_hex(), kind = %object.kind, size = object.size, "stored object");
            object.clone()
        });
        Ok(hash)
    }

    fn get(&self, hash: &ObjectHash) -> StoreResult<StoredObject> {
        self.read_map()?
            .get(hash)
            .cloned()
            .ok_or(StoreError::NotFound(*hash))
    }

    fn has(&self, hash: &ObjectHash) -> StoreResult<bool> {
        Ok(self.read_map()?.contains_key(hash))
    }

    fn iter_all(&self, kind: ObjectKind) -> StoreResult<ObjectIter<'_>> {
        let mut hashes: Vec<ObjectHash> = self
            .read_map()?
            .iter()
            .filter(|(_, obj)| obj.kind == kind)
            .map(|(hash, _)| *hash)
            .collect();
        hashes.sort();
        Ok(Box::new(
            hashes
                .into_iter()
                .map(move |hash| self.get(&hash).map(|obj| (hash, obj))),
        ))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryContentStore")
            .field("object_count", &count)
            .finish()
    }
}
