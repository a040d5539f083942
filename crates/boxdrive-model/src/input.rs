//! Typed inputs for listing operations.
//!
//! Only the listing operations carry enough parameters to deserve input
//! structs; the object operations are fully described by their routing
//! context (bucket, key, body, and a couple of headers).

use crate::types::EncodingType;

/// Input for `ListObjects` (v1).
#[derive(Debug, Clone, Default)]
pub struct ListObjectsInput {
    /// Target bucket (URI path).
    pub bucket: String,
    /// HTTP query: `prefix`.
    pub prefix: Option<String>,
    /// HTTP query: `delimiter`.
    pub delimiter: Option<String>,
    /// HTTP query: `marker`.
    pub marker: Option<String>,
    /// HTTP query: `max-keys`.
    pub max_keys: Option<i32>,
    /// HTTP query: `encoding-type`.
    pub encoding_type: Option<EncodingType>,
}

/// Input for `ListObjectsV2`.
#[derive(Debug, Clone, Default)]
pub struct ListObjectsV2Input {
    /// Target bucket (URI path).
    pub bucket: String,
    /// HTTP query: `prefix`.
    pub prefix: Option<String>,
    /// HTTP query: `delimiter`.
    pub delimiter: Option<String>,
    /// HTTP query: `continuation-token`.
    pub continuation_token: Option<String>,
    /// HTTP query: `start-after`.
    pub start_after: Option<String>,
    /// HTTP query: `max-keys`.
    pub max_keys: Option<i32>,
    /// HTTP query: `encoding-type`.
    pub encoding_type: Option<EncodingType>,
}
