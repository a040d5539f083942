//! Typed outputs rendered as XML response bodies.

use crate::types::{BucketInfo, EncodingType, ObjectInfo};

/// Output of `ListBuckets`, rendered as `ListAllMyBucketsResult`.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsOutput {
    /// All buckets in the store.
    pub buckets: Vec<BucketInfo>,
}

/// Output of `ListObjects` (v1), rendered as `ListBucketResult`.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsOutput {
    /// Bucket name.
    pub name: String,
    /// Echoed `prefix` parameter (empty if absent).
    pub prefix: String,
    /// Echoed `marker` parameter.
    pub marker: Option<String>,
    /// Echoed `delimiter` parameter.
    pub delimiter: Option<String>,
    /// Effective `max-keys`.
    pub max_keys: i32,
    /// Whether the listing was truncated.
    pub is_truncated: bool,
    /// Cursor for the next page; present only when truncated.
    pub next_marker: Option<String>,
    /// Echoed `encoding-type` parameter.
    pub encoding_type: Option<EncodingType>,
    /// Content entries.
    pub contents: Vec<ObjectInfo>,
    /// Rolled-up common prefixes.
    pub common_prefixes: Vec<String>,
}

/// Output of `ListObjectsV2`, rendered as `ListBucketResult`.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsV2Output {
    /// Bucket name.
    pub name: String,
    /// Echoed `prefix` parameter (empty if absent).
    pub prefix: String,
    /// Echoed `delimiter` parameter.
    pub delimiter: Option<String>,
    /// Effective `max-keys`.
    pub max_keys: i32,
    /// Number of keys returned: contents plus common prefixes.
    pub key_count: i32,
    /// Whether the listing was truncated.
    pub is_truncated: bool,
    /// Echoed `continuation-token` parameter.
    pub continuation_token: Option<String>,
    /// Opaque token for the next page; present only when truncated.
    pub next_continuation_token: Option<String>,
    /// Echoed `start-after` parameter.
    pub start_after: Option<String>,
    /// Echoed `encoding-type` parameter.
    pub encoding_type: Option<EncodingType>,
    /// Content entries.
    pub contents: Vec<ObjectInfo>,
    /// Rolled-up common prefixes.
    pub common_prefixes: Vec<String>,
}
