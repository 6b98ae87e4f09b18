use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of one logical repository sharing the object pool.
///
/// Ids are opaque to the storage layer but usually look like the origin
/// they were fetched from (`gitserver.com/a`), so `/` and `.` are allowed.
/// Because flat presentation embeds the id inside reference names, it must
/// not contain anything that would break a ref name.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Validate and wrap a repository id.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        validate(&id)?;
        Ok(Self(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate(id: &str) -> Result<(), TypeError> {
    let reject = |reason: &str| {
        Err(TypeError::InvalidRepositoryId {
            id: id.to_string(),
            reason: reason.to_string(),
        })
    };

    if id.is_empty() {
        return reject("must not be empty");
    }
    if id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return reject("must not contain whitespace or control characters");
    }
    if id.contains("..") {
        return reject("must not contain '..'");
    }
    if id.starts_with('/') || id.ends_with('/') {
        return reject("must not start or end with '/'");
    }
    if id.contains("//") {
        return reject("must not contain consecutive slashes");
    }
    Ok(())
}

impl fmt::Debug for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RepositoryId({})", self.0)
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RepositoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepositoryId {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for RepositoryId {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RepositoryId> for String {
    fn from(id: RepositoryId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_host_style_ids() {
        for id in ["repo", "gitserver.com/a", "github.com/org/project.git"] {
            assert_eq!(RepositoryId::new(id).unwrap().as_str(), id);
        }
    }

    #[test]
    fn rejects_empty() {
        assert!(RepositoryId::new("").is_err());
    }

    #[test]
    fn rejects_whitespace_and_traversal() {
        assert!(RepositoryId::new("a b").is_err());
        assert!(RepositoryId::new("a\nb").is_err());
        assert!(RepositoryId::new("a/../b").is_err());
    }

    #[test]
    fn rejects_slash_boundaries() {
        assert!(RepositoryId::new("/a").is_err());
        assert!(RepositoryId::new("a/").is_err());
        assert!(RepositoryId::new("a//b").is_err());
    }

    #[test]
    fn serde_validates_on_the_way_in() {
        let id = RepositoryId::new("gitserver.com/b").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gitserver.com/b\"");
        assert_eq!(serde_json::from_str::<RepositoryId>(&json).unwrap(), id);
        assert!(serde_json::from_str::<RepositoryId>("\"bad id\"").is_err());
    }
}
