//! Per-repository write locks.
//!
//! A library owns one [`LockRegistry`]. Write-mode opens take an exclusive
//! [`WriteLock`] for their repository id; the lock is released when the
//! guard drops. Read-only opens never touch the registry.

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tracing::{debug, warn};

use rootstore_types::RepositoryId;

use crate::error::{RepoError, RepoResult};
use crate::options::LockPolicy;

#[derive(Debug, Default)]
pub struct LockRegistry {
    held: Mutex<HashSet<RepositoryId>>,
    released: Condvar,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // The set is only ever changed by a single insert or remove, so a
    // poisoned guard still holds a consistent value.
    fn held(&self) -> MutexGuard<'_, HashSet<RepositoryId>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a write lock is currently held for `id`.
    pub fn is_locked(&self, id: &RepositoryId) -> bool {
        self.held().contains(id)
    }

    /// Take the write lock for `id` according to `policy`.
    pub fn acquire(self: &Arc<Self>, id: &RepositoryId, policy: LockPolicy) -> RepoResult<WriteLock> {
        let mut held = self.held();
        if held.contains(id) {
            let Some(timeout) = policy.timeout() else {
                warn!(repo = %id, "write lock contended");
                return Err(RepoError::RepositoryLocked(id.clone()));
            };
            let deadline = Instant::now() + timeout;
            while held.contains(id) {
                let now = Instant::now();
                if now >= deadline {
                    warn!(repo = %id, timeout_ms = timeout.as_millis() as u64, "timed out waiting for write lock");
                    return Err(RepoError::RepositoryLocked(id.clone()));
                }
                held = self
                    .released
                    .wait_timeout(held, deadline - now)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
        }
        held.insert(id.clone());
        debug!(repo = %id, "write lock acquired");
        Ok(WriteLock {
            registry: Arc::clone(self),
            id: id.clone(),
        })
    }

    fn release(&self, id: &RepositoryId) {
        self.held().remove(id);
        self.released.notify_all();
        debug!(repo = %id, "write lock released");
    }
}

/// Exclusive write access to one repository. Released on drop.
#[derive(Debug)]
pub struct WriteLock {
    registry: Arc<LockRegistry>,
    id: RepositoryId,
}

impl WriteLock {
    pub fn repository(&self) -> &RepositoryId {
        &self.id
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        self.registry.release(&self.id);
    }
}
