//! On-disk loose-object content store.
//!
//! Objects live at `<root>/objects/<2 hex>/<38 hex>`, one file per object.
//! Each file is a fixed header followed by a zstd-compressed payload:
//!
//! ```text
//! magic "RSTO" | version u8 | kind u8 | crc32 u32 BE | raw length u64 BE | zstd payload
//! ```
//!
//! The CRC covers the compressed payload. Writes go through a temp file in
//! the destination directory and are renamed into place, so a reader never
//! observes a partially written object.

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use rootstore_types::ObjectHash;

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::{ContentStore, ObjectIter};

const MAGIC: &[u8; 4] = b"RSTO";
const VERSION: u8 = 1;
const HEADER_LEN: usize = 4 + 1 + 1 + 4 + 8;
const ZSTD_LEVEL: i32 = 3;

/// Content store backed by a directory of compressed loose objects.
#[derive(Debug, Clone)]
pub struct DiskContentStore {
    objects_dir: PathBuf,
}

impl DiskContentStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let objects_dir = root.as_ref().join("objects");
        fs::create_dir_all(&objects_dir)?;
        Ok(Self { objects_dir })
    }

    /// Directory holding the fan-out subdirectories.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    fn object_path(&self, hash: &ObjectHash) -> PathBuf {
        let hex = hash.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    fn encode(object: &StoredObject) -> StoreResult<Vec<u8>> {
        let payload = zstd::encode_all(&object.data[..], ZSTD_LEVEL)
            .map_err(|e| StoreError::Compression(e.to_string()))?;
        let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        out.push(object.kind.type_byte());
        out.extend_from_slice(&crc32fast::hash(&payload).to_be_bytes());
        out.extend_from_slice(&object.size.to_be_bytes());
        out.extend_from_slice(&payload);
        Ok(out)
    }

    fn decode(hash: &ObjectHash, bytes: &[u8]) -> StoreResult<StoredObject> {
        let corrupt = |reason: &str| StoreError::CorruptObject {
            id: *hash,
            reason: reason.to_string(),
        };
        if bytes.len() < HEADER_LEN {
            return Err(corrupt("object file shorter than header"));
        }
        if &bytes[0..4] != MAGIC {
            return Err(corrupt("bad magic"));
        }
        if bytes[4] != VERSION {
            return Err(corrupt(&format!("unsupported format version {}", bytes[4])));
        }
        let kind = ObjectKind::from_type_byte(bytes[5])
            .ok_or_else(|| corrupt(&format!("unknown kind byte {}", bytes[5])))?;
        let crc = u32::from_be_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]);
        let mut len_bytes = [0u8; 8];
        len_bytes.copy_from_slice(&bytes[10..18]);
        let raw_len = u64::from_be_bytes(len_bytes);

        let payload = &bytes[HEADER_LEN..];
        if crc32fast::hash(payload) != crc {
            return Err(corrupt("crc32 mismatch"));
        }
        let data =
            zstd::decode_all(payload).map_err(|e| StoreError::Compression(e.to_string()))?;
        if data.len() as u64 != raw_len {
            return Err(corrupt("decompressed length mismatch"));
        }

        let object = StoredObject::new(kind, data);
        if !object.verify(hash) {
            return Err(StoreError::HashMismatch {
                expected: *hash,
                computed: object.hash(),
            });
        }
        Ok(object)
    }

    fn read_kind(path: &Path) -> StoreResult<Option<ObjectKind>> {
        let mut header = [0u8; 6];
        let mut file = fs::File::open(path)?;
        file.read_exact(&mut header)?;
        Ok(ObjectKind::from_type_byte(header[5]))
    }

    /// Every object hash on disk, sorted.
    pub fn all_hashes(&self) -> StoreResult<Vec<ObjectHash>> {
        let mut hashes = Vec::new();
        for fan_out in fs::read_dir(&self.objects_dir)? {
            let fan_out = fan_out?;
            if !fan_out.file_type()?.is_dir() {
                continue;
            }
            let prefix = fan_out.file_name().to_string_lossy().into_owned();
            for entry in fs::read_dir(fan_out.path())? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                // Temp files and strays do not parse as hashes.
                if let Ok(hash) = ObjectHash::from_hex(&format!("{prefix}{name}")) {
                    hashes.push(hash);
                }
            }
        }
        hashes.sort();
        Ok(hashes)
    }
}

impl ContentStore for DiskContentStore {
    fn put(&self, object: &StoredObject) -> StoreResult<ObjectHash> {
        let hash = object.hash();
        let path = self.object_path(&hash);
        if path.exists() {
            return Ok(hash);
        }

        let encoded = Self::encode(object)?;
        let dir = path
            .parent()
            .ok_or_else(|| std::io::Error::other("object path has no parent"))?;
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(hash = %hash.short_hex(), kind = %object.kind, size = object.size, "wrote loose object");
        Ok(hash)
    }

    fn get(&self, hash: &ObjectHash) -> StoreResult<StoredObject> {
        let bytes = match fs::read(self.object_path(hash)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(*hash)),
            Err(e) => return Err(e.into()),
        };
        Self::decode(hash, &bytes).inspect_err(|e| {
            warn!(hash = %hash, error = %e, "loose object failed verification");
        })
    }

    fn has(&self, hash: &ObjectHash) -> StoreResult<bool> {
        Ok(self.object_path(hash).is_file())
    }

    fn iter_all(&self, kind: ObjectKind) -> StoreResult<ObjectIter<'_>> {
        let hashes = self.all_hashes()?;
        Ok(Box::new(hashes.into_iter().filter_map(move |hash| {
            match Self::read_kind(&self.object_path(&hash)) {
                Ok(Some(k)) if k == kind => Some(self.get(&hash).map(|obj| (hash, obj))),
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            }
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Blob;
    use crate::tree::Tree;

    fn make_blob(content: &[u8]) -> StoredObject {
        Blob::new(content.to_vec()).to_stored_object()
    }

    #[test]
    fn put_and_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskContentStore::open(dir.path()).unwrap();
        let obj = make_blob(b"hello on disk");
        let hash = store.put(&obj).unwrap();
        assert_eq!(store.get(&hash).unwrap(), obj);
        assert!(store.has(&hash).unwrap());
    }

    #[test]
    fn uses_git_fan_out_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskContentStore::open(dir.path()).unwrap();
        let hash = store.put(&Tree::empty().to_stored_object()).unwrap();
        assert!(dir
            .path()
            .join("objects/4b/825dc642cb6eb9a060e54bf8d69288fbee4904")
            .is_file());
        assert_eq!(store.get(&hash).unwrap().size, 0);
    }

    #[test]
    fn put_twice_keeps_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskContentStore::open(dir.path()).unwrap();
        let obj = make_blob(b"same");
        assert_eq!(store.put(&obj).unwrap(), store.put(&obj).unwrap());
        assert_eq!(store.all_hashes().unwrap().len(), 1);
    }

    #[test]
    fn missing_object_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskContentStore::open(dir.path()).unwrap();
        let hash = make_blob(b"absent").hash();
        assert!(matches!(store.get(&hash), Err(StoreError::NotFound(_))));
        assert!(!store.has(&hash).unwrap());
    }

    #[test]
    fn reopen_sees_previous_objects() {
        let dir = tempfile::tempdir().unwrap();
        let hash = DiskContentStore::open(dir.path())
            .unwrap()
            .put(&make_blob(b"persisted"))
            .unwrap();
        let reopened = DiskContentStore::open(dir.path()).unwrap();
        assert_eq!(&reopened.get(&hash).unwrap().data[..], b"persisted");
    }

    #[test]
    fn flipped_payload_byte_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskContentStore::open(dir.path()).unwrap();
        let hash = store.put(&make_blob(b"precious bytes")).unwrap();

        let path = store.object_path(&hash);
        let mut bytes = fs::read(&path).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        fs::write(&path, bytes).unwrap();

        let err = store.get(&hash).unwrap_err();
        assert!(err.is_corruption(), "expected corruption, got {err}");
    }

    #[test]
    fn swapped_object_file_is_a_hash_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskContentStore::open(dir.path()).unwrap();
        let good = store.put(&make_blob(b"good")).unwrap();
        let evil = store.put(&make_blob(b"evil")).unwrap();

        // A well-formed file under the wrong name passes the CRC check.
        fs::copy(store.object_path(&evil), store.object_path(&good)).unwrap();

        match store.get(&good) {
            Err(StoreError::HashMismatch { expected, computed }) => {
                assert_eq!(expected, good);
                assert_eq!(computed, evil);
            }
            other => panic!("expected hash mismatch, got {other:?}"),
        }
    }

    #[test]
    fn iter_all_filters_by_kind() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskContentStore::open(dir.path()).unwrap();
        let blob = store.put(&make_blob(b"blob")).unwrap();
        let tree = store.put(&Tree::empty().to_stored_object()).unwrap();

        let blobs: Vec<_> = store
            .iter_all(ObjectKind::Blob)
            .unwrap()
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(blobs, vec![blob]);
        let trees: Vec<_> = store
            .iter_all(ObjectKind::Tree)
            .unwrap()
            .map(|r| r.unwrap().0)
            .collect();
        assert_eq!(trees, vec![tree]);
    }

    #[test]
    fn stray_files_are_ignored_by_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskContentStore::open(dir.path()).unwrap();
        store.put(&make_blob(b"real")).unwrap();
        fs::create_dir_all(store.objects_dir().join("zz")).unwrap();
        fs::write(store.objects_dir().join("zz").join(".tmpXYZ"), b"junk").unwrap();
        assert_eq!(store.all_hashes().unwrap().len(), 1);
    }
}
