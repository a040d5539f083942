//! Shared descriptor types for buckets, objects, and listing results.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bucket descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    /// Bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// Object metadata without the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    /// Object key within its bucket.
    pub key: String,
    /// Body size in bytes.
    pub size: u64,
    /// Last modification time.
    pub last_modified: DateTime<Utc>,
    /// Opaque hex entity tag (unquoted; quoting happens on the wire).
    pub etag: String,
    /// MIME content type.
    pub content_type: String,
}

/// A full object: body bytes plus metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    /// The object body.
    pub data: Bytes,
    /// Object metadata.
    pub info: ObjectInfo,
}

/// Result of a v1 `ListObjects` operation at the store level.
///
/// `next_marker` is the empty string iff `is_truncated` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsInfo {
    /// Content entries, sorted ascending by key.
    pub objects: Vec<ObjectInfo>,
    /// Rolled-up common prefixes, sorted ascending, deduplicated.
    pub common_prefixes: Vec<String>,
    /// Whether more keys remain beyond this page.
    pub is_truncated: bool,
    /// The cursor for the next page; empty when not truncated.
    pub next_marker: String,
}

/// Result of a `ListObjectsV2` operation at the store level.
///
/// Truncation is carried here; the continuation token for the next page is
/// synthesized by the HTTP facade from the last emitted entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsV2Info {
    /// Content entries, sorted ascending by key.
    pub objects: Vec<ObjectInfo>,
    /// Rolled-up common prefixes, sorted ascending, deduplicated.
    pub common_prefixes: Vec<String>,
    /// Whether more keys remain beyond this page.
    pub is_truncated: bool,
}

/// Key encoding requested through the `encoding-type` listing parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncodingType {
    /// Percent-encode emitted keys and common prefixes.
    #[serde(rename = "url")]
    Url,
}

impl EncodingType {
    /// Returns the string value of this enum variant.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
        }
    }
}

impl std::fmt::Display for EncodingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
