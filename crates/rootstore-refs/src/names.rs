//! Reference name validation and presentation translation.
//!
//! Valid reference names follow git's ref-format rules:
//! - `HEAD`, or a name starting with `refs/`
//! - Must not contain whitespace, control characters, `~`, `^`, `:`, `?`,
//!   `*`, `[`, `\`
//! - Must not contain `..` (double dot) or `@{`
//! - Must not end with `/`, `.` or `.lock`
//! - Components between slashes must be non-empty and not start with `.`
//! - `refs/HEAD` is reserved: its flat form would collide with `HEAD`'s
//!
//! Translation maps between the physical names held in the table and the
//! names a caller sees under a [`Presentation`]. Flat presentation is a
//! bijection: `refs/<rest>` is shown as `refs/remotes/<id>/<rest>` and
//! `HEAD` as `refs/remotes/<id>/HEAD`.

use rootstore_types::RepositoryId;

use crate::error::{RefError, Result};
use crate::types::{Presentation, Target};

/// The repository's own HEAD.
pub const HEAD: &str = "HEAD";

/// Characters that are forbidden anywhere in a reference name.
const FORBIDDEN_CHARS: &[char] = &[' ', '\t', '\n', '\r', '~', '^', ':', '?', '*', '[', '\\'];

/// Validate a full reference name, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use rootstore_refs::names::validate_ref_name;
///
/// assert!(validate_ref_name("HEAD").is_ok());
/// assert!(validate_ref_name("refs/heads/feature/auth").is_ok());
/// assert!(validate_ref_name("refs/heads/bad..name").is_err());
/// assert!(validate_ref_name("main").is_err());
/// ```
pub fn validate_ref_name(name: &str) -> Result<()> {
    if name == HEAD {
        return Ok(());
    }
    if !name.starts_with("refs/") {
        return Err(RefError::invalid(name, "must be HEAD or start with 'refs/'"));
    }

    if let Some(ch) = name
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control())
    {
        return Err(RefError::invalid(
            name,
            format!("contains forbidden character: {ch:?}"),
        ));
    }
    if name.contains("..") {
        return Err(RefError::invalid(name, "must not contain '..'"));
    }
    if name.contains("@{") {
        return Err(RefError::invalid(name, "must not contain '@{'"));
    }
    if name.ends_with('.') || name.ends_with('/') {
        return Err(RefError::invalid(name, "must not end with '.' or '/'"));
    }
    if name.ends_with(".lock") {
        return Err(RefError::invalid(name, "must not end with '.lock'"));
    }
    if name == "refs/HEAD" {
        return Err(RefError::invalid(name, "'refs/HEAD' is reserved"));
    }

    for component in name.split('/') {
        if component.is_empty() {
            return Err(RefError::invalid(name, "path components must not be empty"));
        }
        if component.starts_with('.') {
            return Err(RefError::invalid(
                name,
                format!("component must not start with '.': {component:?}"),
            ));
        }
    }

    Ok(())
}

/// The flat prefix for a repository: `refs/remotes/<id>/`.
pub fn remote_prefix(repo: &RepositoryId) -> String {
    format!("refs/remotes/{repo}/")
}

/// Map a physical name to the name presented to callers.
pub fn to_presented(presentation: Presentation, repo: &RepositoryId, physical: &str) -> String {
    match presentation {
        Presentation::Rooted => physical.to_string(),
        Presentation::Flat => {
            let rest = physical.strip_prefix("refs/").unwrap_or(physical);
            format!("{}{rest}", remote_prefix(repo))
        }
    }
}

/// Map a presented name back to its physical name.
///
/// Exact inverse of [`to_presented`]. A bare `HEAD` is also accepted in
/// flat mode and names the repository's own HEAD.
///
/// Returns `None` when a flat name lies outside the repository's prefix.
pub fn to_physical(
    presentation: Presentation,
    repo: &RepositoryId,
    presented: &str,
) -> Option<String> {
    match presentation {
        Presentation::Rooted => Some(presented.to_string()),
        Presentation::Flat => {
            if presented == HEAD {
                return Some(HEAD.to_string());
            }
            match presented.strip_prefix(&remote_prefix(repo))? {
                HEAD => Some(HEAD.to_string()),
                "" => None,
                rest => Some(format!("refs/{rest}")),
            }
        }
    }
}

/// Translate a presented name for a write, rejecting foreign names.
pub(crate) fn physical_for_write(
    presentation: Presentation,
    repo: &RepositoryId,
    presented: &str,
) -> Result<String> {
    let physical = to_physical(presentation, repo, presented).ok_or_else(|| {
        RefError::invalid(
            presented,
            format!("outside the namespace of repository {repo}"),
        )
    })?;
    validate_ref_name(&physical)?;
    Ok(physical)
}

/// Apply [`to_presented`] to a symbolic target.
pub(crate) fn present_target(
    presentation: Presentation,
    repo: &RepositoryId,
    target: Target,
) -> Target {
    match target {
        Target::Symbolic(name) => Target::Symbolic(to_presented(presentation, repo, &name)),
        hash => hash,
    }
}

/// Apply [`physical_for_write`] to a symbolic target.
pub(crate) fn physical_target(
    presentation: Presentation,
    repo: &RepositoryId,
    target: &Target,
) -> Result<Target> {
    Ok(match target {
        Target::Symbolic(name) => Target::Symbolic(physical_for_write(presentation, repo, name)?),
        hash => hash.clone(),
    })
}

/// Listing group of a physical name: heads, tags, remotes, other refs, then
/// everything else (`HEAD`).
pub(crate) fn list_group(name: &str) -> u8 {
    if name.starts_with("refs/heads/") {
        0
    } else if name.starts_with("refs/tags/") {
        1
    } else if name.starts_with("refs/remotes/") {
        2
    } else if name.starts_with("refs/") {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn repo(id: &str) -> RepositoryId {
        RepositoryId::new(id).unwrap()
    }

    // ---- validation ----

    #[test]
    fn valid_names() {
        assert!(validate_ref_name("HEAD").is_ok());
        assert!(validate_ref_name("refs/heads/main").is_ok());
        assert!(validate_ref_name("refs/heads/feature/deep/nested").is_ok());
        assert!(validate_ref_name("refs/tags/v1.0").is_ok());
        assert!(validate_ref_name("refs/remotes/gitserver.com/a/heads/fix").is_ok());
        assert!(validate_ref_name("refs/notes/commits").is_ok());
    }

    #[test]
    fn reject_outside_refs() {
        assert!(validate_ref_name("").is_err());
        assert!(validate_ref_name("main").is_err());
        assert!(validate_ref_name("FETCH_HEAD").is_err());
    }

    #[test]
    fn reject_forbidden_chars() {
        for bad in ["a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b", "a b", "a\tb", "a\u{7f}b"] {
            let name = format!("refs/heads/{bad}");
            assert!(validate_ref_name(&name).is_err(), "{name:?} should be rejected");
        }
    }

    #[test]
    fn reject_structural_problems() {
        assert!(validate_ref_name("refs/heads/bad..name").is_err());
        assert!(validate_ref_name("refs/heads/ref@{0}").is_err());
        assert!(validate_ref_name("refs/heads/main.lock").is_err());
        assert!(validate_ref_name("refs/heads/trailing.").is_err());
        assert!(validate_ref_name("refs/heads/trailing/").is_err());
        assert!(validate_ref_name("refs/heads//x").is_err());
        assert!(validate_ref_name("refs/heads/.hidden").is_err());
    }

    // ---- translation ----

    #[test]
    fn rooted_is_identity() {
        let r = repo("repo");
        for name in ["HEAD", "refs/heads/main", "refs/remotes/origin/fix"] {
            assert_eq!(to_presented(Presentation::Rooted, &r, name), name);
            assert_eq!(to_physical(Presentation::Rooted, &r, name).as_deref(), Some(name));
        }
    }

    #[test]
    fn flat_presents_under_remote_prefix() {
        let r = repo("gitserver.com/a");
        assert_eq!(
            to_presented(Presentation::Flat, &r, "refs/heads/test"),
            "refs/remotes/gitserver.com/a/heads/test"
        );
        assert_eq!(
            to_presented(Presentation::Flat, &r, "HEAD"),
            "refs/remotes/gitserver.com/a/HEAD"
        );
        assert_eq!(
            to_presented(Presentation::Flat, &r, "refs/remotes/origin/master"),
            "refs/remotes/gitserver.com/a/remotes/origin/master"
        );
    }

    #[test]
    fn flat_inbound_known_namespaces() {
        let r = repo("gitserver.com/a");
        let p = |n: &str| to_physical(Presentation::Flat, &r, n);
        assert_eq!(
            p("refs/remotes/gitserver.com/a/heads/test").as_deref(),
            Some("refs/heads/test")
        );
        assert_eq!(
            p("refs/remotes/gitserver.com/a/tags/v1").as_deref(),
            Some("refs/tags/v1")
        );
        assert_eq!(
            p("refs/remotes/gitserver.com/a/notes/commits").as_deref(),
            Some("refs/notes/commits")
        );
        assert_eq!(p("refs/remotes/gitserver.com/a/HEAD").as_deref(), Some("HEAD"));
        assert_eq!(p("HEAD").as_deref(), Some("HEAD"));
    }

    #[test]
    fn flat_inbound_keeps_any_namespace() {
        let r = repo("repo");
        let p = |n: &str| to_physical(Presentation::Flat, &r, n);
        assert_eq!(p("refs/remotes/repo/master").as_deref(), Some("refs/master"));
        assert_eq!(p("refs/remotes/repo/stash").as_deref(), Some("refs/stash"));
        assert_eq!(p("refs/remotes/repo/pull/1/head").as_deref(), Some("refs/pull/1/head"));
        assert_eq!(p("refs/remotes/repo/"), None);
    }

    #[test]
    fn refs_head_is_reserved() {
        assert!(validate_ref_name("refs/HEAD").is_err());
        assert!(validate_ref_name("refs/heads/HEAD").is_ok());
        let r = repo("repo");
        assert!(physical_for_write(Presentation::Flat, &r, "refs/remotes/repo/HEAD").is_ok());
    }

    #[test]
    fn flat_inbound_foreign_names_are_not_mapped() {
        let r = repo("gitserver.com/a");
        assert_eq!(to_physical(Presentation::Flat, &r, "refs/heads/master"), None);
        assert_eq!(
            to_physical(Presentation::Flat, &r, "refs/remotes/gitserver.com/b/heads/x"),
            None
        );
        assert!(physical_for_write(Presentation::Flat, &r, "refs/heads/master").is_err());
    }

    fn physical_name() -> impl Strategy<Value = String> {
        prop_oneof![
            1 => Just(HEAD.to_string()),
            9 => prop::collection::vec("[A-Za-z0-9_-][A-Za-z0-9_.-]{0,8}", 1..5)
                .prop_map(|parts| format!("refs/{}", parts.join("/")))
                .prop_filter("must be a valid name", |n| validate_ref_name(n).is_ok()),
        ]
    }

    proptest! {
        #[test]
        fn flat_roundtrips_physical_names(
            physical in physical_name(),
            id in "[a-z][a-z0-9]{0,6}(\\.[a-z]{1,3})?(/[a-z][a-z0-9]{0,6}){0,2}",
        ) {
            let r = repo(&id);
            let shown = to_presented(Presentation::Flat, &r, &physical);
            prop_assert!(shown.starts_with(&remote_prefix(&r)));
            prop_assert_eq!(
                to_physical(Presentation::Flat, &r, &shown),
                Some(physical.clone())
            );
            prop_assert_eq!(
                physical_for_write(Presentation::Flat, &r, &shown).ok(),
                Some(physical)
            );
        }
    }

    #[test]
    fn symbolic_targets_translate() {
        let r = repo("repo");
        let shown = present_target(
            Presentation::Flat,
            &r,
            Target::Symbolic("refs/heads/main".into()),
        );
        assert_eq!(shown, Target::Symbolic("refs/remotes/repo/heads/main".into()));
        assert_eq!(
            physical_target(Presentation::Flat, &r, &shown).unwrap(),
            Target::Symbolic("refs/heads/main".into())
        );
    }

    #[test]
    fn list_groups_are_ordered() {
        assert!(list_group("refs/heads/z") < list_group("refs/tags/a"));
        assert!(list_group("refs/tags/a") < list_group("refs/remotes/a"));
        assert!(list_group("refs/remotes/a") < list_group("refs/notes/a"));
        assert!(list_group("refs/notes/a") < list_group("HEAD"));
    }
}
