//! The abstract object-store contract.

use async_trait::async_trait;
use bytes::Bytes;

use boxdrive_model::types::{
    BucketInfo, EncodingType, ListObjectsInfo, ListObjectsV2Info, Object, ObjectInfo,
};

use crate::error::StoreResult;

/// Listing parameters for `ListObjects` (v1).
#[derive(Debug, Clone)]
pub struct ListObjectsQuery {
    /// Only keys starting with this prefix are considered.
    pub prefix: Option<String>,
    /// Delimiter for common-prefix rollup.
    pub delimiter: Option<String>,
    /// Page size bound on contents plus common prefixes.
    pub max_keys: usize,
    /// Strict lower bound on returned keys.
    pub marker: Option<String>,
    /// Optional key encoding for the emitted result.
    pub encoding_type: Option<EncodingType>,
}

impl Default for ListObjectsQuery {
    fn default() -> Self {
        Self {
            prefix: None,
            delimiter: None,
            max_keys: 1000,
            marker: None,
            encoding_type: None,
        }
    }
}

/// Listing parameters for `ListObjectsV2`.
#[derive(Debug, Clone)]
pub struct ListObjectsV2Query {
    /// Only keys starting with this prefix are considered.
    pub prefix: Option<String>,
    /// Delimiter for common-prefix rollup.
    pub delimiter: Option<String>,
    /// Page size bound on contents plus common prefixes.
    pub max_keys: usize,
    /// Cursor from a previous truncated response; wins over `start_after`.
    pub continuation_token: Option<String>,
    /// Strict lower bound on returned keys.
    pub start_after: Option<String>,
    /// Optional key encoding for the emitted result.
    pub encoding_type: Option<EncodingType>,
}

impl Default for ListObjectsV2Query {
    fn default() -> Self {
        Self {
            prefix: None,
            delimiter: None,
            max_keys: 1000,
            continuation_token: None,
            start_after: None,
            encoding_type: None,
        }
    }
}

/// The abstract contract implemented by every backing store.
///
/// Failure kinds per operation are the [`StoreError`](crate::StoreError)
/// variants named in each method's documentation; anything else a backend
/// produces is a remote/transport failure.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List all buckets.
    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>>;

    /// Create a bucket. Fails with `BucketAlreadyExists` on collision.
    async fn create_bucket(&self, bucket: &str) -> StoreResult<()>;

    /// Delete a bucket and all objects in it. Fails with `NoSuchBucket`.
    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()>;

    /// List objects (v1). Fails with `NoSuchBucket`.
    async fn list_objects(
        &self,
        bucket: &str,
        query: ListObjectsQuery,
    ) -> StoreResult<ListObjectsInfo>;

    /// List objects (v2). Fails with `NoSuchBucket`.
    async fn list_objects_v2(
        &self,
        bucket: &str,
        query: ListObjectsV2Query,
    ) -> StoreResult<ListObjectsV2Info>;

    /// Get an object with its body. Fails with `NoSuchBucket` / `NoSuchKey`.
    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Object>;

    /// Store an object, replacing any previous body under the same key.
    /// Fails with `NoSuchBucket` when the bucket has not been created.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StoreResult<ObjectInfo>;

    /// Get object metadata without the body. Fails with `NoSuchBucket` /
    /// `NoSuchKey`.
    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo>;

    /// Delete an object. Fails with `NoSuchBucket` / `NoSuchKey`.
    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()>;
}
