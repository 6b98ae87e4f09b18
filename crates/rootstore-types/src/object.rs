use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Width of an object hash in bytes.
pub const HASH_LEN: usize = 20;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectHash` is the SHA-1 digest of an object's git header plus its
/// canonical encoding, so it is interchangeable with the object ids git
/// itself computes. Identical content always produces the same hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ObjectHash([u8; HASH_LEN]);

impl ObjectHash {
    /// Create an `ObjectHash` from a pre-computed digest.
    pub const fn from_raw(hash: [u8; HASH_LEN]) -> Self {
        Self(hash)
    }

    /// The zero hash. Represents "no object".
    pub const fn zero() -> Self {
        Self([0u8; HASH_LEN])
    }

    /// Returns `true` if this is the zero hash.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; HASH_LEN]
    }

    /// The raw 20-byte digest.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Build from a byte slice, which must be exactly [`HASH_LEN`] long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; HASH_LEN] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: HASH_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Hex-encoded string representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex representation (first 7 characters), as git prints it.
    pub fn short_hex(&self) -> String {
        let mut s = self.to_hex();
        s.truncate(7);
        s
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHash({})", self.short_hex())
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectHash {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<[u8; HASH_LEN]> for ObjectHash {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectHash> for [u8; HASH_LEN] {
    fn from(hash: ObjectHash) -> Self {
        hash.0
    }
}

// Hashes travel as hex strings in JSON/TOML so persisted tables stay
// readable and diffable.
impl Serialize for ObjectHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EMPTY_TREE: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

    #[test]
    fn zero_is_all_zeros() {
        let zero = ObjectHash::zero();
        assert!(zero.is_zero());
        assert_eq!(zero.as_bytes(), &[0u8; HASH_LEN]);
        assert_eq!(ObjectHash::default(), zero);
    }

    #[test]
    fn parses_known_hash() {
        let hash = ObjectHash::from_hex(EMPTY_TREE).unwrap();
        assert_eq!(hash.to_hex(), EMPTY_TREE);
        assert_eq!(hash.as_bytes()[0], 0x4b);
        assert_eq!(hash.as_bytes()[19], 0x04);
    }

    #[test]
    fn short_hex_is_7_chars() {
        let hash = ObjectHash::from_hex(EMPTY_TREE).unwrap();
        assert_eq!(hash.short_hex(), "4b825dc");
    }

    #[test]
    fn display_is_full_hex() {
        let hash: ObjectHash = EMPTY_TREE.parse().unwrap();
        assert_eq!(format!("{hash}"), EMPTY_TREE);
        assert_eq!(format!("{hash:?}"), "ObjectHash(4b825dc)");
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(matches!(
            ObjectHash::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = ObjectHash::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: 20,
                actual: 2
            }
        );
        // 32-byte digests from other hash functions are not object hashes.
        assert!(ObjectHash::from_slice(&[0u8; 32]).is_err());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let hash: ObjectHash = EMPTY_TREE.parse().unwrap();
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{EMPTY_TREE}\""));
        let parsed: ObjectHash = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn ordering_follows_bytes() {
        let low = ObjectHash::from_raw([0; HASH_LEN]);
        let high = ObjectHash::from_raw([1; HASH_LEN]);
        assert!(low < high);
    }

    proptest! {
        #[test]
        fn hex_parse_inverts_display(bytes in prop::array::uniform20(any::<u8>())) {
            let hash = ObjectHash::from_raw(bytes);
            prop_assert_eq!(ObjectHash::from_hex(&hash.to_hex()).unwrap(), hash);
        }
    }
}
