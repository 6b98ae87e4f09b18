use rootstore_types::ObjectHash;
use sha1::{Digest, Sha1};

/// Git-style SHA-1 content hasher.
///
/// Each hasher carries the git type name (`"blob"`, `"tree"`, ...) that is
/// written into the object header before the payload. Hashing the same
/// bytes under two type names yields two different ids.
pub struct ContentHasher {
    type_name: &'static str,
}

impl ContentHasher {
    /// Hasher for blob objects.
    pub const BLOB: Self = Self { type_name: "blob" };
    /// Hasher for tree objects.
    pub const TREE: Self = Self { type_name: "tree" };
    /// Hasher for commit objects.
    pub const COMMIT: Self = Self {
        type_name: "commit",
    };
    /// Hasher for annotated tag objects.
    pub const TAG: Self = Self { type_name: "tag" };

    /// Hash an encoded payload, prefixing the `"<type> <len>\0"` header.
    pub fn hash(&self, data: &[u8]) -> ObjectHash {
        let mut hasher = Sha1::new();
        hasher.update(self.type_name.as_bytes());
        hasher.update(b" ");
        hasher.update(data.len().to_string().as_bytes());
        hasher.update([0u8]);
        hasher.update(data);
        ObjectHash::from_raw(to_array(&hasher.finalize()))
    }

    /// Verify that data produces the expected object hash.
    pub fn verify(&self, data: &[u8], expected: &ObjectHash) -> bool {
        self.hash(data) == *expected
    }
}

fn to_array(digest: &[u8]) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(digest);
    out
}
