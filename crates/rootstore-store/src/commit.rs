//! Commit and annotated tag objects.
//!
//! Both are header blocks followed by a blank line and a free-form message:
//!
//! ```text
//! tree <tree-hex>
//! parent <parent-hex>
//! author <name> <email> <timestamp> <timezone>
//! committer <name> <email> <timestamp> <timezone>
//!
//! <message>
//! ```
//!
//! Text is decoded lossily when it is not UTF-8; the stored bytes stay
//! authoritative for hashing.

use chrono::{DateTime, FixedOffset, TimeZone};

use rootstore_types::ObjectHash;

use crate::error::{StoreError, StoreResult};
use crate::object::{expect_kind, ObjectKind, StoredObject};

/// Author, committer or tagger identity with a timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: DateTime<FixedOffset>,
}

impl Signature {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        when: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
        }
    }

    /// Encode as `Name <email> <unix-seconds> <+hhmm>`.
    pub fn encode(&self) -> String {
        let offset = self.when.offset().local_minus_utc();
        let sign = if offset < 0 { '-' } else { '+' };
        let offset = offset.abs();
        format!(
            "{} <{}> {} {}{:02}{:02}",
            self.name,
            self.email,
            self.when.timestamp(),
            sign,
            offset / 3600,
            (offset % 3600) / 60
        )
    }

    /// Parse the encoded form. Returns `None` on malformed input.
    pub fn parse(value: &str) -> Option<Self> {
        let open = value.rfind('<')?;
        let close = value.rfind('>')?;
        if close < open {
            return None;
        }
        let name = value[..open].trim_end().to_string();
        let email = value[open + 1..close].to_string();

        let mut tail = value[close + 1..].split_whitespace();
        let secs: i64 = tail.next()?.parse().ok()?;
        let tz = tail.next().unwrap_or("+0000");
        let offset = parse_offset(tz)?;
        let when = offset.timestamp_opt(secs, 0).single()?;
        Some(Self { name, email, when })
    }
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    if tz.len() != 5 || !tz.is_ascii() {
        return None;
    }
    let sign = match &tz[..1] {
        "+" => 1,
        "-" => -1,
        _ => return None,
    };
    let hours: i32 = tz[1..3].parse().ok()?;
    let minutes: i32 = tz[3..5].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Header lines plus message, split at the first blank line.
struct RawRecord {
    headers: Vec<(String, String)>,
    message: String,
}

fn parse_record(data: &[u8]) -> Result<RawRecord, String> {
    let text = String::from_utf8_lossy(data);
    let (head, message) = match text.find("\n\n") {
        Some(pos) => (&text[..pos], text[pos + 2..].to_string()),
        None => (text.trim_end_matches('\n'), String::new()),
    };

    let mut headers: Vec<(String, String)> = Vec::new();
    for line in head.split('\n') {
        if let Some(continuation) = line.strip_prefix(' ') {
            let (_, value) = headers
                .last_mut()
                .ok_or_else(|| "continuation line before any header".to_string())?;
            value.push('\n');
            value.push_str(continuation);
            continue;
        }
        let (key, value) = line
            .split_once(' ')
            .ok_or_else(|| format!("malformed header line {line:?}"))?;
        headers.push((key.to_string(), value.to_string()));
    }
    Ok(RawRecord { headers, message })
}

fn push_header(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push(' ');
    out.push_str(&value.replace('\n', "\n "));
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A commit: root tree, parent commits, authorship and message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    pub tree: ObjectHash,
    pub parents: Vec<ObjectHash>,
    pub author: Signature,
    pub committer: Signature,
    /// Headers after `committer` (`encoding`, `gpgsig`, `mergetag`, ...),
    /// kept in order so decode-then-encode reproduces the stored bytes.
    pub extra_headers: Vec<(String, String)>,
    pub message: String,
}

impl Commit {
    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        let mut out = String::new();
        push_header(&mut out, "tree", &self.tree.to_hex());
        for parent in &self.parents {
            push_header(&mut out, "parent", &parent.to_hex());
        }
        push_header(&mut out, "author", &self.author.encode());
        push_header(&mut out, "committer", &self.committer.encode());
        for (key, value) in &self.extra_headers {
            push_header(&mut out, key, value);
        }
        out.push('\n');
        out.push_str(&self.message);
        StoredObject::new(ObjectKind::Commit, out.into_bytes())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        expect_kind(obj, ObjectKind::Commit)?;
        let corrupt = |reason: String| StoreError::CorruptObject {
            id: obj.hash(),
            reason,
        };
        let raw = parse_record(&obj.data).map_err(&corrupt)?;

        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;
        let mut extra_headers = Vec::new();
        for (key, value) in raw.headers {
            match key.as_str() {
                "tree" if tree.is_none() => {
                    tree = Some(parse_hash(&value).map_err(&corrupt)?);
                }
                "parent" => parents.push(parse_hash(&value).map_err(&corrupt)?),
                "author" if author.is_none() => {
                    author = Some(
                        Signature::parse(&value)
                            .ok_or_else(|| corrupt(format!("bad author {value:?}")))?,
                    );
                }
                "committer" if committer.is_none() => {
                    committer = Some(
                        Signature::parse(&value)
                            .ok_or_else(|| corrupt(format!("bad committer {value:?}")))?,
                    );
                }
                _ => extra_headers.push((key, value)),
            }
        }

        Ok(Self {
            tree: tree.ok_or_else(|| corrupt("commit without tree".into()))?,
            parents,
            author: author.ok_or_else(|| corrupt("commit without author".into()))?,
            committer: committer.ok_or_else(|| corrupt("commit without committer".into()))?,
            extra_headers,
            message: raw.message,
        })
    }

    /// Returns `true` for commits with more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

fn parse_hash(value: &str) -> Result<ObjectHash, String> {
    ObjectHash::from_hex(value.trim()).map_err(|e| format!("bad hash {value:?}: {e}"))
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// An annotated tag pointing at another object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub object: ObjectHash,
    pub target_kind: ObjectKind,
    pub name: String,
    /// Very old tags were written without a tagger line.
    pub tagger: Option<Signature>,
    pub message: String,
}

impl Tag {
    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        let mut out = String::new();
        push_header(&mut out, "object", &self.object.to_hex());
        push_header(&mut out, "type", self.target_kind.as_str());
        push_header(&mut out, "tag", &self.name);
        if let Some(tagger) = &self.tagger {
            push_header(&mut out, "tagger", &tagger.encode());
        }
        out.push('\n');
        out.push_str(&self.message);
        StoredObject::new(ObjectKind::Tag, out.into_bytes())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        expect_kind(obj, ObjectKind::Tag)?;
        let corrupt = |reason: String| StoreError::CorruptObject {
            id: obj.hash(),
            reason,
        };
        let raw = parse_record(&obj.data).map_err(&corrupt)?;

        let mut object = None;
        let mut target_kind = None;
        let mut name = None;
        let mut tagger = None;
        for (key, value) in raw.headers {
            match key.as_str() {
                "object" => object = Some(parse_hash(&value).map_err(&corrupt)?),
                "type" => {
                    target_kind = Some(
                        ObjectKind::from_type_name(&value)
                            .ok_or_else(|| corrupt(format!("bad tag type {value:?}")))?,
                    );
                }
                "tag" => name = Some(value),
                "tagger" => tagger = Signature::parse(&value),
                _ => {}
            }
        }

        Ok(Self {
            object: object.ok_or_else(|| corrupt("tag without object".into()))?,
            target_kind: target_kind.ok_or_else(|| corrupt("tag without type".into()))?,
            name: name.ok_or_else(|| corrupt("tag without name".into()))?,
            tagger,
            message: raw.message,
        })
    }
}
