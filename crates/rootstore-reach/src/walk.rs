//! Breadth-first reachability walk over the shared object pool.
//!
//! Edges followed:
//! - commit -> root tree, commit -> each parent
//! - tree -> each entry, except submodule entries (they name commits that
//!   live in another repository's history)
//! - tag -> target object
//!
//! Blobs are terminal. Every object is fetched exactly once thanks to the
//! visited set, so shared history across refs costs nothing extra.

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use tracing::{debug, info, info_span};

use rootstore_store::{ContentStore, EntryMode, Object, StoreError};
use rootstore_types::ObjectHash;

use crate::error::{ReachError, ReachResult, Referrer};
use crate::set::ReachabilitySet;

/// A starting point for the walk: a reference name and the hash it
/// resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seed {
    pub name: String,
    pub hash: ObjectHash,
}

impl Seed {
    pub fn new(name: impl Into<String>, hash: ObjectHash) -> Self {
        Self {
            name: name.into(),
            hash,
        }
    }
}

fn enqueue(
    visited: &mut HashSet<ObjectHash>,
    queue: &mut VecDeque<(ObjectHash, Referrer)>,
    hash: ObjectHash,
    referrer: Referrer,
) {
    if visited.insert(hash) {
        queue.push_back((hash, referrer));
    }
}

fn corrupt(object: ObjectHash, referrer: Referrer, reason: impl Into<String>) -> ReachError {
    ReachError::CorruptGraph {
        object,
        referrer,
        reason: reason.into(),
    }
}

/// Compute every object reachable from `seeds`.
///
/// Fails with [`ReachError::CorruptGraph`] if any reachable object is
/// missing from `store` or cannot be decoded; no partial set is returned.
pub fn compute<S>(store: &S, seeds: impl IntoIterator<Item = Seed>) -> ReachResult<ReachabilitySet>
where
    S: ContentStore + ?Sized,
{
    let started = Instant::now();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    let mut seed_count = 0usize;
    for seed in seeds {
        seed_count += 1;
        enqueue(&mut visited, &mut queue, seed.hash, Referrer::Reference(seed.name));
    }
    let _span = info_span!("reachability", seeds = seed_count).entered();

    let mut set = ReachabilitySet::new();
    while let Some((hash, referrer)) = queue.pop_front() {
        let stored = match store.get(&hash) {
            Ok(obj) => obj,
            Err(StoreError::NotFound(_)) => return Err(corrupt(hash, referrer, "missing object")),
            Err(e) if e.is_corruption() => return Err(corrupt(hash, referrer, e.to_string())),
            Err(e) => return Err(ReachError::Store(e)),
        };
        set.insert(stored.kind, hash);

        let object = stored
            .decode()
            .map_err(|e| corrupt(hash, referrer.clone(), e.to_string()))?;
        let here = Referrer::Object(hash);
        match object {
            Object::Commit(commit) => {
                enqueue(&mut visited, &mut queue, commit.tree, here.clone());
                for parent in commit.parents {
                    enqueue(&mut visited, &mut queue, parent, here.clone());
                }
            }
            Object::Tree(tree) => {
                for entry in tree.entries {
                    if entry.mode == EntryMode::Submodule {
                        debug!(tree = %hash.short_hex(), name = %entry.name, "skipping submodule entry");
                        continue;
                    }
                    enqueue(&mut visited, &mut queue, entry.hash, here.clone());
                }
            }
            Object::Tag(tag) => enqueue(&mut visited, &mut queue, tag.object, here),
            Object::Blob(_) => {}
        }
    }

    info!(
        seeds = seed_count,
        commits = set.commits().len(),
        trees = set.trees().len(),
        blobs = set.blobs().len(),
        tags = set.tags().len(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "computed reachability"
    );
    Ok(set)
}
