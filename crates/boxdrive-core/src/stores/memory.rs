//! In-memory reference store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use md5::{Digest, Md5};
use tracing::debug;

use boxdrive_model::constants::DEFAULT_CONTENT_TYPE;
use boxdrive_model::types::{
    BucketInfo, ListObjectsInfo, ListObjectsV2Info, Object, ObjectInfo,
};

use crate::error::{StoreError, StoreResult};
use crate::list::{filter_objects, filter_objects_v2};
use crate::store::{ListObjectsQuery, ListObjectsV2Query, ObjectStore};
use crate::validation::{validate_bucket_name, validate_key};

/// One bucket's state: creation time plus a sorted key→object map.
#[derive(Debug, Default)]
struct Bucket {
    creation_date: DateTime<Utc>,
    objects: BTreeMap<String, Object>,
}

/// In-process object store holding buckets and objects in memory.
///
/// ETags are the MD5 hex of the body; last-modified is the wall clock at put
/// time. Listing materializes the bucket's object descriptors and delegates
/// to the list-protocol engine. Buckets must be created explicitly — a put
/// into an absent bucket is `NoSuchBucket`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: DashMap<String, Bucket>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize object descriptors for a bucket, or `NoSuchBucket`.
    fn object_infos(&self, bucket: &str) -> StoreResult<Vec<ObjectInfo>> {
        let bucket_ref = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket {
                bucket: bucket.to_owned(),
            })?;
        Ok(bucket_ref
            .objects
            .values()
            .map(|obj| obj.info.clone())
            .collect())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        let mut buckets: Vec<BucketInfo> = self
            .buckets
            .iter()
            .map(|entry| BucketInfo {
                name: entry.key().clone(),
                creation_date: entry.value().creation_date,
            })
            .collect();
        buckets.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        validate_bucket_name(bucket)?;
        match self.buckets.entry(bucket.to_owned()) {
            Entry::Occupied(_) => Err(StoreError::BucketAlreadyExists {
                bucket: bucket.to_owned(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Bucket {
                    creation_date: Utc::now(),
                    objects: BTreeMap::new(),
                });
                debug!(bucket, "bucket created");
                Ok(())
            }
        }
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        if self.buckets.remove(bucket).is_none() {
            return Err(StoreError::NoSuchBucket {
                bucket: bucket.to_owned(),
            });
        }
        debug!(bucket, "bucket deleted");
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        query: ListObjectsQuery,
    ) -> StoreResult<ListObjectsInfo> {
        let objects = self.object_infos(bucket)?;
        Ok(filter_objects(
            objects,
            query.prefix.as_deref(),
            query.delimiter.as_deref(),
            query.max_keys,
            query.marker.as_deref(),
            query.encoding_type,
        ))
    }

    async fn list_objects_v2(
        &self,
        bucket: &str,
        query: ListObjectsV2Query,
    ) -> StoreResult<ListObjectsV2Info> {
        let objects = self.object_infos(bucket)?;
        Ok(filter_objects_v2(
            objects,
            query.prefix.as_deref(),
            query.delimiter.as_deref(),
            query.max_keys,
            query.continuation_token.as_deref(),
            query.start_after.as_deref(),
            query.encoding_type,
        ))
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Object> {
        let bucket_ref = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket {
                bucket: bucket.to_owned(),
            })?;
        bucket_ref
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NoSuchKey {
                key: key.to_owned(),
            })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> StoreResult<ObjectInfo> {
        validate_key(key)?;
        let mut bucket_ref =
            self.buckets
                .get_mut(bucket)
                .ok_or_else(|| StoreError::NoSuchBucket {
                    bucket: bucket.to_owned(),
                })?;

        let etag = hex::encode(Md5::digest(&data));
        let info = ObjectInfo {
            key: key.to_owned(),
            size: data.len() as u64,
            last_modified: Utc::now(),
            etag,
            content_type: content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_owned(),
        };
        bucket_ref.objects.insert(
            key.to_owned(),
            Object {
                data,
                info: info.clone(),
            },
        );
        debug!(bucket, key, size = info.size, "object stored");
        Ok(info)
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo> {
        let bucket_ref = self
            .buckets
            .get(bucket)
            .ok_or_else(|| StoreError::NoSuchBucket {
                bucket: bucket.to_owned(),
            })?;
        bucket_ref
            .objects
            .get(key)
            .map(|obj| obj.info.clone())
            .ok_or_else(|| StoreError::NoSuchKey {
                key: key.to_owned(),
            })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let mut bucket_ref =
            self.buckets
                .get_mut(bucket)
                .ok_or_else(|| StoreError::NoSuchBucket {
                    bucket: bucket.to_owned(),
                })?;
        if bucket_ref.objects.remove(key).is_none() {
            return Err(StoreError::NoSuchKey {
                key: key.to_owned(),
            });
        }
        debug!(bucket, key, "object deleted");
        Ok(())
    }
}
