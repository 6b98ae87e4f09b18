//! A handle onto one repository of a library.
//!
//! The handle sees the shared object pool through its reachability set:
//! only objects reachable from the repository's own references are
//! iterated or returned. The set is computed on first use, cached for the
//! life of the handle, and recomputed after any reference write made
//! through the handle.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use rootstore_reach::{compute, ReachabilitySet, Seed};
use rootstore_refs::{
    Expected, Presentation, RefError, Reference, ReferenceTable, ScopedRefs, Target,
};
use rootstore_store::{
    Blob, Commit, ContentStore, Object, ObjectKind, StoreResult, StoredObject, Tag, Tree,
};
use rootstore_types::{ObjectHash, RepositoryId};

use crate::error::{RepoError, RepoResult};
use crate::lock::WriteLock;
use crate::options::LibraryOptions;

/// Access mode of a repository handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mode {
    ReadOnly,
    ReadWrite,
}

/// Lazy sequence of the handle's references. Call
/// [`Repository::references`] again to restart it.
pub type ReferenceIter = std::vec::IntoIter<Reference>;

/// Lazy sequence of `(hash, object)` pairs scoped to one repository.
pub type ObjectIter<'a> = Box<dyn Iterator<Item = RepoResult<(ObjectHash, StoredObject)>> + 'a>;

/// Lazy sequence of decoded records scoped to one repository.
pub type TypedIter<'a, T> = Box<dyn Iterator<Item = RepoResult<(ObjectHash, T)>> + 'a>;

/// An open repository.
///
/// Dropping the handle releases its write lock, if any.
pub struct Repository {
    id: RepositoryId,
    mode: Mode,
    store: Arc<dyn ContentStore>,
    refs: Arc<dyn ReferenceTable>,
    presentation: Presentation,
    max_symbolic_depth: usize,
    lock: Option<WriteLock>,
    reach: Mutex<Option<Arc<ReachabilitySet>>>,
    closed: bool,
}

impl Repository {
    pub(crate) fn new(
        id: RepositoryId,
        mode: Mode,
        store: Arc<dyn ContentStore>,
        refs: Arc<dyn ReferenceTable>,
        options: &LibraryOptions,
        lock: Option<WriteLock>,
    ) -> Self {
        Self {
            id,
            mode,
            store,
            refs,
            presentation: options.presentation,
            max_symbolic_depth: options.max_symbolic_depth,
            lock,
            reach: Mutex::new(None),
            closed: false,
        }
    }

    pub fn id(&self) -> &RepositoryId {
        &self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    // ---------------------------------------------------------------
    // Guards
    // ---------------------------------------------------------------

    fn ensure_open(&self) -> RepoResult<()> {
        if self.closed {
            return Err(RepoError::HandleClosed(self.id.clone()));
        }
        Ok(())
    }

    fn ensure_writable(&self) -> RepoResult<()> {
        self.ensure_open()?;
        if self.mode != Mode::ReadWrite {
            return Err(RepoError::ReadOnly(self.id.clone()));
        }
        Ok(())
    }

    fn scoped(&self) -> ScopedRefs<'_> {
        ScopedRefs::new(
            self.refs.as_ref(),
            &self.id,
            self.presentation,
            self.max_symbolic_depth,
        )
    }

    fn physical(&self) -> ScopedRefs<'_> {
        ScopedRefs::new(
            self.refs.as_ref(),
            &self.id,
            Presentation::Rooted,
            self.max_symbolic_depth,
        )
    }

    // A poisoned cache slot only ever holds a complete value or `None`.
    fn cache(&self) -> MutexGuard<'_, Option<Arc<ReachabilitySet>>> {
        self.reach.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn invalidate(&self) {
        if self.cache().take().is_some() {
            debug!(repo = %self.id, "reachability invalidated");
        }
    }

    // ---------------------------------------------------------------
    // References
    // ---------------------------------------------------------------

    /// All references of the repository, as presented.
    pub fn references(&self) -> RepoResult<ReferenceIter> {
        self.ensure_open()?;
        Ok(self.scoped().list()?.into_iter())
    }

    /// Look up one reference by presented name.
    pub fn reference(&self, name: &str, follow_symbolic: bool) -> RepoResult<Reference> {
        self.ensure_open()?;
        Ok(self.scoped().resolve(name, follow_symbolic)?)
    }

    /// Unconditionally write a reference.
    pub fn set_reference(&self, reference: &Reference) -> RepoResult<()> {
        self.check_and_set_reference(reference, &Expected::Any)
    }

    /// Write a reference if its current value satisfies `expected`.
    ///
    /// Hash targets must already exist in the content store; symbolic
    /// targets are not checked.
    pub fn check_and_set_reference(
        &self,
        reference: &Reference,
        expected: &Expected,
    ) -> RepoResult<()> {
        self.ensure_writable()?;
        if let Target::Hash(hash) = &reference.target {
            if !self.store.has(hash)? {
                return Err(RepoError::ObjectNotFound(*hash));
            }
        }
        self.scoped().check_and_set(reference, expected)?;
        self.invalidate();
        Ok(())
    }

    /// Delete a reference. Returns `false` if it did not exist.
    pub fn remove_reference(&self, name: &str) -> RepoResult<bool> {
        self.ensure_writable()?;
        let removed = self.scoped().remove(name)?;
        if removed {
            self.invalidate();
        }
        Ok(removed)
    }

    // ---------------------------------------------------------------
    // Reachability
    // ---------------------------------------------------------------

    fn seeds(&self) -> RepoResult<Vec<Seed>> {
        let physical = self.physical();
        let mut seeds = Vec::new();
        for reference in physical.list()? {
            match reference.target {
                Target::Hash(hash) => seeds.push(Seed::new(reference.name, hash)),
                Target::Symbolic(_) => match physical.resolve_hash(&reference.name) {
                    Ok(hash) => seeds.push(Seed::new(reference.name, hash)),
                    Err(RefError::NotFound { .. } | RefError::Cycle { .. }) => {
                        debug!(repo = %self.id, name = %reference.name, "skipping dangling symbolic reference");
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }
        Ok(seeds)
    }

    /// The set of objects reachable from this repository's references.
    pub fn reachability(&self) -> RepoResult<Arc<ReachabilitySet>> {
        self.ensure_open()?;
        let mut cache = self.cache();
        if let Some(set) = cache.as_ref() {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(compute(self.store.as_ref(), self.seeds()?)?);
        *cache = Some(Arc::clone(&set));
        Ok(set)
    }

    // ---------------------------------------------------------------
    // Objects
    // ---------------------------------------------------------------

    /// Every reachable object of `kind`, in hash order.
    pub fn iter_objects(&self, kind: ObjectKind) -> RepoResult<ObjectIter<'_>> {
        let reach = self.reachability()?;
        let all = self.store.iter_all(kind)?;
        Ok(Box::new(all.filter_map(move |item| match item {
            Ok((hash, obj)) if reach.contains(kind, &hash) => Some(Ok((hash, obj))),
            Ok(_) => None,
            Err(e) => Some(Err(e.into())),
        })))
    }

    fn typed_objects<T: 'static>(
        &self,
        kind: ObjectKind,
        decode: fn(&StoredObject) -> StoreResult<T>,
    ) -> RepoResult<TypedIter<'_, T>> {
        Ok(Box::new(self.iter_objects(kind)?.map(move |item| {
            let (hash, obj) = item?;
            Ok((hash, decode(&obj)?))
        })))
    }

    pub fn commit_objects(&self) -> RepoResult<TypedIter<'_, Commit>> {
        self.typed_objects(ObjectKind::Commit, Commit::from_stored_object)
    }

    pub fn tree_objects(&self) -> RepoResult<TypedIter<'_, Tree>> {
        self.typed_objects(ObjectKind::Tree, Tree::from_stored_object)
    }

    pub fn blob_objects(&self) -> RepoResult<TypedIter<'_, Blob>> {
        self.typed_objects(ObjectKind::Blob, Blob::from_stored_object)
    }

    pub fn tag_objects(&self) -> RepoResult<TypedIter<'_, Tag>> {
        self.typed_objects(ObjectKind::Tag, Tag::from_stored_object)
    }

    /// Read an object reachable from this repository.
    ///
    /// Objects that exist in the pool but belong only to other
    /// repositories are reported as not found.
    pub fn object(&self, hash: &ObjectHash) -> RepoResult<StoredObject> {
        if !self.reachability()?.contains_any(hash) {
            return Err(RepoError::ObjectNotFound(*hash));
        }
        Ok(self.store.get(hash)?)
    }

    pub fn has_object(&self, hash: &ObjectHash) -> RepoResult<bool> {
        Ok(self.reachability()?.contains_any(hash))
    }

    /// Encode and store a record. Returns its hash.
    pub fn new_encoded_object(&self, object: &Object) -> RepoResult<ObjectHash> {
        self.set_encoded_object(&object.encode())
    }

    /// Store an already encoded object. Returns its hash.
    ///
    /// The object becomes visible through this handle once a reference
    /// reaches it.
    pub fn set_encoded_object(&self, object: &StoredObject) -> RepoResult<ObjectHash> {
        self.ensure_writable()?;
        Ok(self.store.put(object)?)
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Release the handle. Closing twice is a no-op.
    pub fn close(&mut self) -> RepoResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.lock.take();
        self.invalidate();
        debug!(repo = %self.id, mode = ?self.mode, "repository closed");
        Ok(())
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("id", &self.id)
            .field("mode", &self.mode)
            .field("presentation", &self.presentation)
            .field("closed", &self.closed)
            .finish()
    }
}
