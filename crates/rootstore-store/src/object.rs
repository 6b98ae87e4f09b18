use bytes::Bytes;
use serde::{Deserialize, Serialize};

use rootstore_crypto::ContentHasher;
use rootstore_types::ObjectHash;

use crate::commit::{Commit, Tag};
use crate::error::{StoreError, StoreResult};
use crate::tree::Tree;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Snapshot of history: root tree, parents, authorship.
    Commit,
    /// Directory listing: ordered entries mapping names to object hashes.
    Tree,
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Annotated tag pointing at another object.
    Tag,
}

impl ObjectKind {
    /// All kinds, in git's type-number order.
    pub const ALL: [ObjectKind; 4] = [Self::Commit, Self::Tree, Self::Blob, Self::Tag];

    /// The git type name (`"commit"`, `"tree"`, `"blob"`, `"tag"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Commit => "commit",
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::Tag => "tag",
        }
    }

    /// Parse a git type name.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "commit" => Some(Self::Commit),
            "tree" => Some(Self::Tree),
            "blob" => Some(Self::Blob),
            "tag" => Some(Self::Tag),
            _ => None,
        }
    }

    /// Serialize to a type byte (git's pack type numbers).
    pub fn type_byte(&self) -> u8 {
        match self {
            Self::Commit => 1,
            Self::Tree => 2,
            Self::Blob => 3,
            Self::Tag => 4,
        }
    }

    /// Parse from a type byte.
    pub fn from_type_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Commit),
            2 => Some(Self::Tree),
            3 => Some(Self::Blob),
            4 => Some(Self::Tag),
            _ => None,
        }
    }

    fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Commit => &ContentHasher::COMMIT,
            Self::Tree => &ContentHasher::TREE,
            Self::Blob => &ContentHasher::BLOB,
            Self::Tag => &ContentHasher::TAG,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored object: kind tag + canonical encoding + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// encoding; it only hashes it. `data` is reference counted, so cloning an
/// object out of a store does not copy its bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The canonical encoded bytes of the object.
    pub data: Bytes,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed hash for this object.
    pub fn hash(&self) -> ObjectHash {
        self.kind.hasher().hash(&self.data)
    }

    /// Whether this object's content hashes to `expected`.
    pub fn verify(&self, expected: &ObjectHash) -> bool {
        self.kind.hasher().verify(&self.data, expected)
    }

    /// Decode the payload into its typed record.
    pub fn decode(&self) -> StoreResult<Object> {
        Object::decode(self)
    }
}

/// A decoded object record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Commit(Commit),
    Tree(Tree),
    Blob(Blob),
    Tag(Tag),
}

impl Object {
    /// The kind of this record.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Encode into canonical bytes.
    pub fn encode(&self) -> StoredObject {
        match self {
            Self::Commit(c) => c.to_stored_object(),
            Self::Tree(t) => t.to_stored_object(),
            Self::Blob(b) => b.to_stored_object(),
            Self::Tag(t) => t.to_stored_object(),
        }
    }

    /// Hash of the canonical encoding.
    pub fn hash(&self) -> ObjectHash {
        self.encode().hash()
    }

    /// Decode a stored object according to its kind.
    pub fn decode(obj: &StoredObject) -> StoreResult<Self> {
        Ok(match obj.kind {
            ObjectKind::Commit => Self::Commit(Commit::from_stored_object(obj)?),
            ObjectKind::Tree => Self::Tree(Tree::from_stored_object(obj)?),
            ObjectKind::Blob => Self::Blob(Blob::from_stored_object(obj)?),
            ObjectKind::Tag => Self::Tag(Tag::from_stored_object(obj)?),
        })
    }
}

impl From<Commit> for Object {
    fn from(c: Commit) -> Self {
        Self::Commit(c)
    }
}

impl From<Tree> for Object {
    fn from(t: Tree) -> Self {
        Self::Tree(t)
    }
}

impl From<Blob> for Object {
    fn from(b: Blob) -> Self {
        Self::Blob(b)
    }
}

impl From<Tag> for Object {
    fn from(t: Tag) -> Self {
        Self::Tag(t)
    }
}

/// Check that `obj` has the expected kind before decoding it.
pub(crate) fn expect_kind(obj: &StoredObject, kind: ObjectKind) -> StoreResult<()> {
    if obj.kind != kind {
        return Err(StoreError::CorruptObject {
            id: obj.hash(),
            reason: format!("expected {kind}, got {}", obj.kind),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Bytes,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        expect_kind(obj, ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}
