use std::collections::HashSet;

use rootstore_store::ObjectKind;
use rootstore_types::ObjectHash;

/// The objects reachable from one repository's references, by kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReachabilitySet {
    commits: HashSet<ObjectHash>,
    trees: HashSet<ObjectHash>,
    blobs: HashSet<ObjectHash>,
    tags: HashSet<ObjectHash>,
}

impl ReachabilitySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `hash` as reachable. Returns `false` if it was already present.
    pub fn insert(&mut self, kind: ObjectKind, hash: ObjectHash) -> bool {
        self.of_kind_mut(kind).insert(hash)
    }

    /// The reachable hashes of one kind.
    pub fn of_kind(&self, kind: ObjectKind) -> &HashSet<ObjectHash> {
        match kind {
            ObjectKind::Commit => &self.commits,
            ObjectKind::Tree => &self.trees,
            ObjectKind::Blob => &self.blobs,
            ObjectKind::Tag => &self.tags,
        }
    }

    fn of_kind_mut(&mut self, kind: ObjectKind) -> &mut HashSet<ObjectHash> {
        match kind {
            ObjectKind::Commit => &mut self.commits,
            ObjectKind::Tree => &mut self.trees,
            ObjectKind::Blob => &mut self.blobs,
            ObjectKind::Tag => &mut self.tags,
        }
    }

    pub fn commits(&self) -> &HashSet<ObjectHash> {
        &self.commits
    }

    pub fn trees(&self) -> &HashSet<ObjectHash> {
        &self.trees
    }

    pub fn blobs(&self) -> &HashSet<ObjectHash> {
        &self.blobs
    }

    pub fn tags(&self) -> &HashSet<ObjectHash> {
        &self.tags
    }

    /// Whether `hash` is reachable as an object of `kind`.
    pub fn contains(&self, kind: ObjectKind, hash: &ObjectHash) -> bool {
        self.of_kind(kind).contains(hash)
    }

    /// Whether `hash` is reachable as any kind.
    pub fn contains_any(&self, hash: &ObjectHash) -> bool {
        ObjectKind::ALL.iter().any(|k| self.contains(*k, hash))
    }

    /// Number of reachable objects of `kind`.
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.of_kind(kind).len()
    }

    /// Total number of reachable objects.
    pub fn len(&self) -> usize {
        ObjectKind::ALL.iter().map(|k| self.count(*k)).sum()
    }

    /// Returns `true` if nothing is reachable.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
