use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rootstore_refs::{Presentation, DEFAULT_MAX_SYMBOLIC_DEPTH};

use crate::error::{RepoError, RepoResult};

/// What a write-mode open does when another handle holds the lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LockPolicy {
    /// Fail immediately with `RepositoryLocked`.
    #[default]
    Fail,
    /// Block until the lock is released or the timeout elapses.
    Wait { timeout_ms: u64 },
}

impl LockPolicy {
    pub fn wait(timeout: Duration) -> Self {
        Self::Wait {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// How long to wait, or `None` for fail-fast.
    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Self::Fail => None,
            Self::Wait { timeout_ms } => Some(Duration::from_millis(*timeout_ms)),
        }
    }
}

/// Configuration for a [`Library`](crate::Library).
///
/// Loadable from TOML; missing keys take their defaults:
///
/// ```toml
/// presentation = "rooted"
/// max_symbolic_depth = 5
///
/// [lock_policy]
/// mode = "wait"
/// timeout_ms = 500
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryOptions {
    /// How reference names are presented by every handle of the library.
    pub presentation: Presentation,
    /// Maximum symbolic hops when resolving a reference.
    pub max_symbolic_depth: usize,
    /// Contention behavior for write-mode opens.
    pub lock_policy: LockPolicy,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            presentation: Presentation::Flat,
            max_symbolic_depth: DEFAULT_MAX_SYMBOLIC_DEPTH,
            lock_policy: LockPolicy::Fail,
        }
    }
}

impl LibraryOptions {
    /// Defaults with rooted presentation.
    pub fn rooted() -> Self {
        Self {
            presentation: Presentation::Rooted,
            ..Default::default()
        }
    }

    /// Defaults with flat presentation.
    pub fn flat() -> Self {
        Self::default()
    }

    pub fn with_lock_policy(mut self, policy: LockPolicy) -> Self {
        self.lock_policy = policy;
        self
    }

    pub fn from_toml_str(s: &str) -> RepoResult<Self> {
        toml::from_str(s).map_err(|e| RepoError::Config(e.to_string()))
    }

    /// Read options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RepoError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> RepoResult<String> {
        toml::to_string(self).map_err(|e| RepoError::Config(e.to_string()))
    }
}
