//! One repository's view of the reference table.
//!
//! [`ScopedRefs`] binds a table to a repository id and a [`Presentation`].
//! Callers speak presented names; the table only ever sees physical ones.

use tracing::debug;

use rootstore_types::{ObjectHash, RepositoryId};

use crate::error::{RefError, Result};
use crate::names::{
    physical_for_write, physical_target, present_target, to_physical, to_presented, HEAD,
};
use crate::traits::ReferenceTable;
use crate::types::{Expected, Presentation, Reference, Target};

/// Default bound on symbolic hops.
pub const DEFAULT_MAX_SYMBOLIC_DEPTH: usize = 5;

/// References of a single repository, translated for presentation.
#[derive(Clone, Copy)]
pub struct ScopedRefs<'a> {
    table: &'a dyn ReferenceTable,
    repo: &'a RepositoryId,
    presentation: Presentation,
    max_depth: usize,
}

impl<'a> ScopedRefs<'a> {
    pub fn new(
        table: &'a dyn ReferenceTable,
        repo: &'a RepositoryId,
        presentation: Presentation,
        max_depth: usize,
    ) -> Self {
        Self {
            table,
            repo,
            presentation,
            max_depth,
        }
    }

    /// The repository this view is bound to.
    pub fn repository(&self) -> &RepositoryId {
        self.repo
    }

    /// The active presentation mode.
    pub fn presentation(&self) -> Presentation {
        self.presentation
    }

    fn presented(&self, physical: &str) -> String {
        to_presented(self.presentation, self.repo, physical)
    }

    /// Follow symbolic targets from a physical name to a hash reference,
    /// returning the physical name of the last hop with its hash.
    fn follow(&self, physical: String, target: Target) -> Result<(String, ObjectHash)> {
        let mut name = physical;
        let mut target = target;
        let mut hops = 0;
        loop {
            match target {
                Target::Hash(hash) => return Ok((name, hash)),
                Target::Symbolic(next) => {
                    if hops == self.max_depth {
                        return Err(RefError::Cycle {
                            name: self.presented(&name),
                            depth: self.max_depth,
                        });
                    }
                    hops += 1;
                    target = self
                        .table
                        .read(self.repo, &next)?
                        .ok_or_else(|| RefError::not_found(self.presented(&next)))?;
                    name = next;
                }
            }
        }
    }

    /// Look up a reference by presented name.
    ///
    /// With `follow_symbolic`, symbolic targets are chased to a hash and the
    /// result names the last reference in the chain.
    pub fn resolve(&self, name: &str, follow_symbolic: bool) -> Result<Reference> {
        let physical = to_physical(self.presentation, self.repo, name)
            .ok_or_else(|| RefError::not_found(name))?;
        let target = self
            .table
            .read(self.repo, &physical)?
            .ok_or_else(|| RefError::not_found(name))?;

        if !follow_symbolic {
            return Ok(Reference {
                name: self.presented(&physical),
                target: present_target(self.presentation, self.repo, target),
            });
        }
        let (last, hash) = self.follow(physical, target)?;
        Ok(Reference::hash(self.presented(&last), hash))
    }

    /// Resolve a presented name all the way to an object hash.
    pub fn resolve_hash(&self, name: &str) -> Result<ObjectHash> {
        let reference = self.resolve(name, true)?;
        reference
            .target
            .hash()
            .ok_or_else(|| RefError::not_found(name))
    }

    /// The repository's references, translated.
    ///
    /// Flat presentation hides the physical `HEAD` and appends a hash
    /// reference `refs/remotes/<id>/HEAD` carrying HEAD's resolved hash.
    pub fn list(&self) -> Result<Vec<Reference>> {
        let physical = self.table.list(self.repo)?;
        if self.presentation == Presentation::Rooted {
            return Ok(physical);
        }

        let mut out = Vec::with_capacity(physical.len());
        let mut head = None;
        for reference in physical {
            if reference.name == HEAD {
                head = Some(reference.target);
                continue;
            }
            out.push(Reference {
                name: self.presented(&reference.name),
                target: present_target(self.presentation, self.repo, reference.target),
            });
        }

        if let Some(target) = head {
            match self.follow(HEAD.to_string(), target) {
                Ok((_, hash)) => out.push(Reference::hash(self.presented(HEAD), hash)),
                Err(RefError::NotFound { .. } | RefError::Cycle { .. }) => {
                    debug!(repo = %self.repo, "HEAD does not resolve; omitted from listing");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(out)
    }

    /// Write `new` (presented) if the current value satisfies `expected`.
    pub fn check_and_set(&self, new: &Reference, expected: &Expected) -> Result<()> {
        let physical = Reference {
            name: physical_for_write(self.presentation, self.repo, &new.name)?,
            target: physical_target(self.presentation, self.repo, &new.target)?,
        };
        let expected = match expected {
            Expected::Target(t) => {
                Expected::Target(physical_target(self.presentation, self.repo, t)?)
            }
            other => other.clone(),
        };
        self.table.check_and_set(self.repo, &physical, &expected)
    }

    /// Unconditional write of `new` (presented).
    pub fn set(&self, new: &Reference) -> Result<()> {
        self.check_and_set(new, &Expected::Any)
    }

    /// Delete a reference by presented name.
    pub fn remove(&self, name: &str) -> Result<bool> {
        match to_physical(self.presentation, self.repo, name) {
            Some(physical) => self.table.remove(self.repo, &physical),
            None => Ok(false),
        }
    }
}

impl std::fmt::Debug for ScopedRefs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedRefs")
            .field("repo", self.repo)
            .field("presentation", &self.presentation)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
