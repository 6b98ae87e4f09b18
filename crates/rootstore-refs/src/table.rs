//! Backend-independent reference table state.
//!
//! Both backends hold one [`TableState`] and differ only in how they guard
//! and persist it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use rootstore_types::RepositoryId;

use crate::error::{RefError, Result};
use crate::names::{list_group, validate_ref_name};
use crate::types::{Expected, Reference, Target};

/// Every repository's references, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TableState {
    repositories: BTreeMap<RepositoryId, Vec<Reference>>,
}

impl TableState {
    pub(crate) fn read(&self, repo: &RepositoryId, name: &str) -> Option<Target> {
        self.repositories
            .get(repo)?
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.target.clone())
    }

    pub(crate) fn list(&self, repo: &RepositoryId) -> Vec<Reference> {
        let mut refs = self.repositories.get(repo).cloned().unwrap_or_default();
        // Stable sort keeps insertion order inside each group.
        refs.sort_by_key(|r| list_group(&r.name));
        refs
    }

    pub(crate) fn check_and_set(
        &mut self,
        repo: &RepositoryId,
        new: &Reference,
        expected: &Expected,
    ) -> Result<()> {
        validate_ref_name(&new.name)?;
        if let Target::Symbolic(target) = &new.target {
            validate_ref_name(target)?;
        }

        let current = self.read(repo, &new.name);
        if !expected.matches(current.as_ref()) {
            let actual = current.map_or_else(|| "absent".to_string(), |t| t.to_string());
            warn!(repo = %repo, name = %new.name, %expected, %actual, "reference CAS mismatch");
            return Err(RefError::CasMismatch {
                name: new.name.clone(),
                expected: expected.to_string(),
                actual,
            });
        }

        let refs = self.repositories.entry(repo.clone()).or_default();
        match refs.iter_mut().find(|r| r.name == new.name) {
            Some(slot) => slot.target = new.target.clone(),
            None => refs.push(new.clone()),
        }
        debug!(repo = %repo, name = %new.name, target = %new.target, "reference updated");
        Ok(())
    }

    pub(crate) fn remove(&mut self, repo: &RepositoryId, name: &str) -> bool {
        let Some(refs) = self.repositories.get_mut(repo) else {
            return false;
        };
        let before = refs.len();
        refs.retain(|r| r.name != name);
        let removed = refs.len() != before;
        if removed {
            debug!(repo = %repo, name, "reference removed");
        }
        removed
    }

    pub(crate) fn create_repository(&mut self, repo: &RepositoryId) -> Result<()> {
        if self.repositories.contains_key(repo) {
            return Err(RefError::RepositoryExists(repo.clone()));
        }
        self.repositories.insert(repo.clone(), Vec::new());
        debug!(repo = %repo, "repository registered");
        Ok(())
    }

    pub(crate) fn repositories(&self) -> Vec<RepositoryId> {
        self.repositories.keys().cloned().collect()
    }

    pub(crate) fn contains_repository(&self, repo: &RepositoryId) -> bool {
        self.repositories.contains_key(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rootstore_types::ObjectHash;

    fn repo(id: &str) -> RepositoryId {
        RepositoryId::new(id).unwrap()
    }

    fn h(byte: u8) -> ObjectHash {
        ObjectHash::from_raw([byte; 20])
    }

    #[test]
    fn list_groups_then_insertion_order() {
        let mut state = TableState::default();
        let r = repo("a");
        for reference in [
            Reference::symbolic("HEAD", "refs/heads/master"),
            Reference::hash("refs/remotes/origin/master", h(1)),
            Reference::hash("refs/tags/v1", h(2)),
            Reference::hash("refs/heads/master", h(3)),
            Reference::hash("refs/heads/fix", h(4)),
            Reference::hash("refs/notes/commits", h(5)),
        ] {
            state.check_and_set(&r, &reference, &Expected::Any).unwrap();
        }
        let names: Vec<_> = state.list(&r).into_iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "refs/heads/master",
                "refs/heads/fix",
                "refs/tags/v1",
                "refs/remotes/origin/master",
                "refs/notes/commits",
                "HEAD",
            ]
        );
    }

    #[test]
    fn update_keeps_slot() {
        let mut state = TableState::default();
        let r = repo("a");
        state.check_and_set(&r, &Reference::hash("refs/heads/a", h(1)), &Expected::Any).unwrap();
        state.check_and_set(&r, &Reference::hash("refs/heads/b", h(2)), &Expected::Any).unwrap();
        state.check_and_set(&r, &Reference::hash("refs/heads/a", h(9)), &Expected::Any).unwrap();
        let list = state.list(&r);
        assert_eq!(list[0], Reference::hash("refs/heads/a", h(9)));
        assert_eq!(list[1].name, "refs/heads/b");
    }

    #[test]
    fn mismatch_leaves_state_unchanged() {
        let mut state = TableState::default();
        let r = repo("a");
        state.check_and_set(&r, &Reference::hash("refs/heads/a", h(1)), &Expected::Any).unwrap();
        let before = state.clone();
        let err = state
            .check_and_set(
                &r,
                &Reference::hash("refs/heads/a", h(2)),
                &Expected::Target(Target::Hash(h(7))),
            )
            .unwrap_err();
        assert!(matches!(err, RefError::CasMismatch { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn mismatch_on_unknown_repository_registers_nothing() {
        let mut state = TableState::default();
        let r = repo("ghost");
        let expected = Expected::Target(Target::Hash(h(1)));
        assert!(state
            .check_and_set(&r, &Reference::hash("refs/heads/a", h(2)), &expected)
            .is_err());
        assert!(!state.contains_repository(&r));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut state = TableState::default();
        let r = repo("a");
        assert!(state
            .check_and_set(&r, &Reference::hash("refs/heads/a..b", h(1)), &Expected::Any)
            .is_err());
        assert!(state
            .check_and_set(&r, &Reference::symbolic("HEAD", "not a ref"), &Expected::Any)
            .is_err());
        assert!(!state.contains_repository(&r));
    }

    #[test]
    fn serde_roundtrip_preserves_order() {
        let mut state = TableState::default();
        let r = repo("gitserver.com/a");
        state.check_and_set(&r, &Reference::hash("refs/heads/z", h(1)), &Expected::Any).unwrap();
        state.check_and_set(&r, &Reference::hash("refs/heads/a", h(2)), &Expected::Any).unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: TableState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
