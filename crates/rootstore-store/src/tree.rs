//! Tree objects in git's canonical encoding.
//!
//! Each entry is encoded as `<octal mode> <name>\0<20-byte hash>`, with no
//! separator between entries. Entries are ordered the way git orders them:
//! by name bytes, with directory names compared as if they ended in `/`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use rootstore_types::{ObjectHash, HASH_LEN};

use crate::error::{StoreError, StoreResult};
use crate::object::{expect_kind, ObjectKind, StoredObject};

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Subtree / directory (0o040000).
    Directory,
    /// Submodule commit (0o160000). Points outside this object pool.
    Submodule,
}

impl EntryMode {
    /// Octal mode value.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
            Self::Submodule => 0o160000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o040000 => Some(Self::Directory),
            0o160000 => Some(Self::Submodule),
            _ => None,
        }
    }

    /// The kind of object an entry with this mode points at.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            Self::Submodule => ObjectKind::Commit,
            Self::Regular | Self::Executable | Self::Symlink => ObjectKind::Blob,
        }
    }
}

// Git writes modes without leading zeros: directories are "40000".
impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// File mode (regular, executable, symlink, directory, submodule).
    pub mode: EntryMode,
    /// Entry name (filename or directory name).
    pub name: String,
    /// Content-addressed hash of the referenced object.
    pub hash: ObjectHash,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: EntryMode, name: impl Into<String>, hash: ObjectHash) -> Self {
        Self {
            mode,
            name: name.into(),
            hash,
        }
    }

    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        let suffix = (self.mode == EntryMode::Directory).then_some(b'/');
        self.name.bytes().chain(suffix)
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }
}

/// Directory listing object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Tree {
    /// Entries in canonical order.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries.
    ///
    /// Entries are sorted into git order for deterministic hashing.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        let mut data = Vec::with_capacity(self.entries.len() * (HASH_LEN + 32));
        for entry in &self.entries {
            data.extend_from_slice(entry.mode.to_string().as_bytes());
            data.push(b' ');
            data.extend_from_slice(entry.name.as_bytes());
            data.push(0);
            data.extend_from_slice(entry.hash.as_bytes());
        }
        StoredObject::new(ObjectKind::Tree, data)
    }

    /// Decode from a `StoredObject`.
    ///
    /// Entry order is kept exactly as stored.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        expect_kind(obj, ObjectKind::Tree)?;
        let corrupt = |reason: String| StoreError::CorruptObject {
            id: obj.hash(),
            reason,
        };

        let mut entries = Vec::new();
        let mut rest = &obj.data[..];
        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| corrupt("tree entry without mode separator".into()))?;
            let mode_str = std::str::from_utf8(&rest[..space])
                .map_err(|_| corrupt("non-ascii tree entry mode".into()))?;
            let bits = u32::from_str_radix(mode_str, 8)
                .map_err(|_| corrupt(format!("invalid tree entry mode {mode_str:?}")))?;
            let mode = EntryMode::from_mode_bits(bits)
                .ok_or_else(|| corrupt(format!("unsupported tree entry mode {mode_str}")))?;
            rest = &rest[space + 1..];

            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| corrupt("tree entry name not terminated".into()))?;
            let name = String::from_utf8_lossy(&rest[..nul]).into_owned();
            rest = &rest[nul + 1..];

            if rest.len() < HASH_LEN {
                return Err(corrupt(format!("truncated hash for entry {name:?}")));
            }
            let hash = ObjectHash::from_slice(&rest[..HASH_LEN])
                .map_err(|e| corrupt(e.to_string()))?;
            rest = &rest[HASH_LEN..];

            entries.push(TreeEntry { mode, name, hash });
        }
        Ok(Self { entries })
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
