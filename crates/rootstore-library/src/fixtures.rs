//! Shared test pool: three repositories with overlapping history.
//!
//! - `gitserver.com/a`: two branches off one root commit.
//! - `gitserver.com/b`: a fork of `a` with its own commits, `a`'s branches
//!   as `origin` remotes and a symbolic `HEAD`.
//! - `gitserver.com/c`: unrelated history with an annotated tag and a
//!   submodule entry.
//!
//! One blob is stored but unreachable from every repository.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{FixedOffset, TimeZone};

use rootstore_refs::{InMemoryReferenceTable, Reference, ReferenceTable};
use rootstore_store::{
    Blob, Commit, ContentStore, EntryMode, InMemoryContentStore, ObjectKind, Signature,
    StoredObject, Tag, Tree, TreeEntry,
};
use rootstore_types::{ObjectHash, RepositoryId};

use crate::library::Library;
use crate::options::LibraryOptions;
use crate::repository::Repository;

pub(crate) fn repo_id(id: &str) -> RepositoryId {
    RepositoryId::new(id).unwrap()
}

pub(crate) fn signature(secs: i64) -> Signature {
    let when = FixedOffset::east_opt(3600).unwrap().timestamp_opt(secs, 0).unwrap();
    Signature::new("author", "author@example.com", when)
}

pub(crate) fn commit_record(tree: ObjectHash, parents: Vec<ObjectHash>, secs: i64) -> Commit {
    Commit {
        tree,
        parents,
        author: signature(secs),
        committer: signature(secs),
        extra_headers: Vec::new(),
        message: format!("change {secs}\n"),
    }
}

/// Objects a repository is expected to reach, by kind.
#[derive(Debug, Default)]
pub(crate) struct Reachable {
    pub commits: HashSet<ObjectHash>,
    pub trees: HashSet<ObjectHash>,
    pub blobs: HashSet<ObjectHash>,
    pub tags: HashSet<ObjectHash>,
}

impl Reachable {
    pub fn of_kind(&self, kind: ObjectKind) -> &HashSet<ObjectHash> {
        match kind {
            ObjectKind::Commit => &self.commits,
            ObjectKind::Tree => &self.trees,
            ObjectKind::Blob => &self.blobs,
            ObjectKind::Tag => &self.tags,
        }
    }
}

pub(crate) struct Fixture {
    pub store: Arc<InMemoryContentStore>,
    pub refs: Arc<InMemoryReferenceTable>,

    pub readme: ObjectHash,
    pub b_only: ObjectHash,
    pub orphan: ObjectHash,

    pub a_root: ObjectHash,
    pub a_master: ObjectHash,
    pub a_fix: ObjectHash,
    pub b_master: ObjectHash,
    pub b_fix: ObjectHash,
    pub c_master: ObjectHash,
    pub c_tag: ObjectHash,

    pub a: Reachable,
    pub b: Reachable,
    pub c: Reachable,
}

struct Builder {
    store: Arc<InMemoryContentStore>,
}

impl Builder {
    fn put(&self, obj: StoredObject) -> ObjectHash {
        self.store.put(&obj).unwrap()
    }

    fn blob(&self, content: &str) -> ObjectHash {
        self.put(Blob::new(content.as_bytes().to_vec()).to_stored_object())
    }

    fn tree(&self, entries: Vec<TreeEntry>) -> ObjectHash {
        self.put(Tree::new(entries).to_stored_object())
    }

    fn commit(&self, tree: ObjectHash, parents: Vec<ObjectHash>, secs: i64) -> ObjectHash {
        self.put(commit_record(tree, parents, secs).to_stored_object())
    }
}

fn file(name: &str, hash: ObjectHash) -> TreeEntry {
    TreeEntry::new(EntryMode::Regular, name, hash)
}

fn dir(name: &str, hash: ObjectHash) -> TreeEntry {
    TreeEntry::new(EntryMode::Directory, name, hash)
}

impl Fixture {
    pub fn build() -> Self {
        let b = Builder {
            store: Arc::new(InMemoryContentStore::new()),
        };
        let refs = Arc::new(InMemoryReferenceTable::new());

        // ---- gitserver.com/a ----
        let readme = b.blob("# project\n");
        let main_rs = b.blob("fn main() {}\n");
        let fix_txt = b.blob("fixed\n");
        let a_t1 = b.tree(vec![file("README", readme)]);
        let a_root = b.commit(a_t1, vec![], 1);
        let src = b.tree(vec![file("main.rs", main_rs)]);
        let a_t2 = b.tree(vec![file("README", readme), dir("src", src)]);
        let a_master = b.commit(a_t2, vec![a_root], 2);
        let a_t3 = b.tree(vec![file("README", readme), file("fix.txt", fix_txt)]);
        let a_fix = b.commit(a_t3, vec![a_root], 3);

        let a = repo_id("gitserver.com/a");
        refs.set(&a, &Reference::hash("refs/heads/fix", a_fix)).unwrap();
        refs.set(&a, &Reference::hash("refs/heads/master", a_master)).unwrap();

        // ---- gitserver.com/b ----
        let b_only = b.blob("b\n");
        let b_t = b.tree(vec![file("README", readme), file("b.txt", b_only), dir("src", src)]);
        let b_master = b.commit(b_t, vec![a_master], 4);
        let b_fix_t = b.tree(vec![
            file("README", readme),
            file("b.txt", b_only),
            file("fix.txt", fix_txt),
        ]);
        let b_fix = b.commit(b_fix_t, vec![a_fix], 5);

        let bid = repo_id("gitserver.com/b");
        refs.set(&bid, &Reference::symbolic("HEAD", "refs/heads/master")).unwrap();
        refs.set(&bid, &Reference::hash("refs/heads/fix", b_fix)).unwrap();
        refs.set(&bid, &Reference::hash("refs/heads/master", b_master)).unwrap();
        refs.set(&bid, &Reference::hash("refs/remotes/origin/fix", a_fix)).unwrap();
        refs.set(&bid, &Reference::hash("refs/remotes/origin/master", a_master)).unwrap();
        refs.set(&bid, &Reference::hash("refs/remotes/origin/HEAD", a_master)).unwrap();

        // ---- gitserver.com/c ----
        let c_blob = b.blob("c\n");
        let foreign = ObjectHash::from_raw([0xee; 20]);
        let c_t = b.tree(vec![
            file("c.txt", c_blob),
            TreeEntry::new(EntryMode::Submodule, "vendor", foreign),
        ]);
        let c_master = b.commit(c_t, vec![], 6);
        let c_tag = b.put(
            Tag {
                object: c_master,
                target_kind: ObjectKind::Commit,
                name: "v1".into(),
                tagger: Some(signature(7)),
                message: "first release\n".into(),
            }
            .to_stored_object(),
        );

        let cid = repo_id("gitserver.com/c");
        refs.set(&cid, &Reference::symbolic("HEAD", "refs/heads/master")).unwrap();
        refs.set(&cid, &Reference::hash("refs/heads/master", c_master)).unwrap();
        refs.set(&cid, &Reference::hash("refs/tags/v1", c_tag)).unwrap();

        let orphan = b.blob("nobody points here\n");

        let a_expected = Reachable {
            commits: HashSet::from([a_root, a_master, a_fix]),
            trees: HashSet::from([a_t1, src, a_t2, a_t3]),
            blobs: HashSet::from([readme, main_rs, fix_txt]),
            tags: HashSet::new(),
        };
        let b_expected = Reachable {
            commits: HashSet::from([a_root, a_master, a_fix, b_master, b_fix]),
            trees: HashSet::from([a_t1, src, a_t2, a_t3, b_t, b_fix_t]),
            blobs: HashSet::from([readme, main_rs, fix_txt, b_only]),
            tags: HashSet::new(),
        };
        let c_expected = Reachable {
            commits: HashSet::from([c_master]),
            trees: HashSet::from([c_t]),
            blobs: HashSet::from([c_blob]),
            tags: HashSet::from([c_tag]),
        };

        Self {
            store: b.store,
            refs,
            readme,
            b_only,
            orphan,
            a_root,
            a_master,
            a_fix,
            b_master,
            b_fix,
            c_master,
            c_tag,
            a: a_expected,
            b: b_expected,
            c: c_expected,
        }
    }

    /// A library over this pool. Libraries built from one fixture share
    /// backends but not lock registries.
    pub fn library(&self, options: LibraryOptions) -> Library {
        Library::new(self.store.clone(), self.refs.clone(), options)
    }
}

/// Hashes yielded by one kind's object iterator.
pub(crate) fn collect(repo: &Repository, kind: ObjectKind) -> HashSet<ObjectHash> {
    let hashes: Vec<ObjectHash> = repo
        .iter_objects(kind)
        .unwrap()
        .map(|item| {
            let (hash, obj) = item.unwrap();
            assert_eq!(obj.kind, kind);
            hash
        })
        .collect();
    let set: HashSet<ObjectHash> = hashes.iter().copied().collect();
    assert_eq!(set.len(), hashes.len(), "an object was yielded twice");
    set
}

/// Install a test subscriber so `RUST_LOG`-style output shows up with
/// `--nocapture`. Safe to call from several tests.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
