//! Core reference types.
//!
//! A reference is a name plus a target. Targets are either a direct object
//! hash or another reference name (symbolic, like git's `HEAD`).

use std::fmt;

use serde::{Deserialize, Serialize};

use rootstore_types::ObjectHash;

/// What a reference points at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    /// Direct pointer to an object.
    Hash(ObjectHash),
    /// Pointer to another reference by name.
    Symbolic(String),
}

impl Target {
    /// The object hash, if this is a direct target.
    pub fn hash(&self) -> Option<ObjectHash> {
        match self {
            Self::Hash(h) => Some(*h),
            Self::Symbolic(_) => None,
        }
    }

    /// The referenced name, if this is a symbolic target.
    pub fn symbolic(&self) -> Option<&str> {
        match self {
            Self::Hash(_) => None,
            Self::Symbolic(name) => Some(name),
        }
    }
}

// Same shape as a loose ref file: a bare hash, or `ref: <name>`.
impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hash(h) => write!(f, "{h}"),
            Self::Symbolic(name) => write!(f, "ref: {name}"),
        }
    }
}

/// A named reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    /// Full reference name (`refs/heads/main`, `HEAD`).
    pub name: String,
    /// Where the reference points.
    pub target: Target,
}

impl Reference {
    /// A reference pointing directly at an object.
    pub fn hash(name: impl Into<String>, hash: ObjectHash) -> Self {
        Self {
            name: name.into(),
            target: Target::Hash(hash),
        }
    }

    /// A reference pointing at another reference.
    pub fn symbolic(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: Target::Symbolic(target.into()),
        }
    }

    /// Returns `true` if the target is another reference.
    pub fn is_symbolic(&self) -> bool {
        matches!(self.target, Target::Symbolic(_))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.name, self.target)
    }
}

/// Precondition for a compare-and-set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expected {
    /// No precondition; the write always applies.
    Any,
    /// The reference must not exist yet.
    Absent,
    /// The reference must currently hold exactly this target.
    Target(Target),
}

impl Expected {
    /// Whether `current` satisfies this precondition.
    pub fn matches(&self, current: Option<&Target>) -> bool {
        match self {
            Self::Any => true,
            Self::Absent => current.is_none(),
            Self::Target(t) => current == Some(t),
        }
    }
}

impl From<Target> for Expected {
    fn from(t: Target) -> Self {
        Self::Target(t)
    }
}

impl From<Option<Target>> for Expected {
    fn from(t: Option<Target>) -> Self {
        t.map_or(Self::Absent, Self::Target)
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Absent => f.write_str("absent"),
            Self::Target(t) => write!(f, "{t}"),
        }
    }
}

/// How a repository's reference names are presented to callers.
///
/// The mode changes translation only; physical storage is identical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    /// Names pass through unchanged (`refs/heads/main`).
    Rooted,
    /// Names are nested under the repository's remote prefix
    /// (`refs/remotes/<id>/heads/main`).
    #[default]
    Flat,
}
