//! Object store backed by a branch of a GitLab repository.
//!
//! Buckets map to top-level directories and objects to files at
//! `{bucket}/{key}` on the configured branch. A bucket is materialized by an
//! invisible placeholder file. Every mutating operation and every listing
//! serializes per bucket through a [`Keysmith`], so a bucket sees a serial
//! order of commits and a listing observes a consistent snapshot.
//!
//! Listings avoid O(N) metadata calls: keys are fetched page by page from
//! the recursive tree endpoint and wrapped in skeletal descriptors, the
//! list filter decides which keys are actually emitted (its decisions depend
//! only on key strings), and only those keys get a HEAD, in bounded batches.

pub mod client;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use boxdrive_model::constants::DEFAULT_CONTENT_TYPE;
use boxdrive_model::types::{
    BucketInfo, ListObjectsInfo, ListObjectsV2Info, Object, ObjectInfo,
};

use crate::error::{StoreError, StoreResult};
use crate::keysmith::Keysmith;
use crate::list::{filter_objects, filter_objects_v2};
use crate::store::{ListObjectsQuery, ListObjectsV2Query, ObjectStore};
use crate::validation::{validate_bucket_name, validate_key};

use client::{CreateFile, DeleteFile, File, GitlabClient, TreeItemType, TreeParams, remote_error};

/// Hard cap on tree pages fetched for one listing.
const MAX_PAGE: u32 = 10_000;
/// Floor for the tree page size.
const MIN_PER_PAGE: u32 = 20;
/// HEAD fan-out batch size, bounding concurrency against the remote API.
const BATCH_SIZE: usize = 20;
/// Page size used when draining a bucket for deletion.
const DELETE_PER_PAGE: u32 = 1000;

/// Construction options for [`GitlabStore`].
#[derive(Debug, Clone)]
pub struct GitlabConfig {
    /// Numeric GitLab project ID.
    pub repo_id: u64,
    /// Branch holding the object tree.
    pub branch: String,
    /// Bearer token for the API.
    pub access_token: String,
    /// API base URL.
    pub api_url: String,
    /// Name of the invisible file that keeps a bucket directory alive.
    pub placeholder_name: String,
}

impl Default for GitlabConfig {
    fn default() -> Self {
        Self {
            repo_id: 0,
            branch: "main".to_owned(),
            access_token: String::new(),
            api_url: "https://gitlab.com/api/v4/".to_owned(),
            placeholder_name: ".gitkeep".to_owned(),
        }
    }
}

/// Object store persisting to a GitLab repository branch.
#[derive(Debug)]
pub struct GitlabStore {
    client: GitlabClient,
    branch: String,
    placeholder_name: String,
    keysmith: Keysmith,
}

/// SHA-256 hex of a body; the etag scheme of this store.
fn compute_etag(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// File path of an object on the branch.
fn object_path(bucket: &str, key: &str) -> String {
    format!("{bucket}/{key}")
}

/// Split a tree path back into bucket and key.
fn split_path(path: &str) -> Option<(&str, &str)> {
    path.split_once('/')
}

/// Skeletal descriptor carrying only the key; enough for the list filter.
fn skeletal_object(key: &str) -> ObjectInfo {
    ObjectInfo {
        key: key.to_owned(),
        size: 0,
        last_modified: DateTime::UNIX_EPOCH,
        etag: String::new(),
        content_type: DEFAULT_CONTENT_TYPE.to_owned(),
    }
}

fn skeletal_objects(keys: &[String]) -> Vec<ObjectInfo> {
    keys.iter().map(|key| skeletal_object(key)).collect()
}

/// Shared shape of both listing results, letting one collection routine
/// serve v1 and v2.
trait ListOutcome {
    fn is_truncated(&self) -> bool;
    fn contents(&self) -> &[ObjectInfo];
    fn contents_mut(&mut self) -> &mut Vec<ObjectInfo>;
}

impl ListOutcome for ListObjectsInfo {
    fn is_truncated(&self) -> bool {
        self.is_truncated
    }
    fn contents(&self) -> &[ObjectInfo] {
        &self.objects
    }
    fn contents_mut(&mut self) -> &mut Vec<ObjectInfo> {
        &mut self.objects
    }
}

impl ListOutcome for ListObjectsV2Info {
    fn is_truncated(&self) -> bool {
        self.is_truncated
    }
    fn contents(&self) -> &[ObjectInfo] {
        &self.objects
    }
    fn contents_mut(&mut self) -> &mut Vec<ObjectInfo> {
        &mut self.objects
    }
}

impl GitlabStore {
    /// Build a store from its configuration.
    ///
    /// Fails if the placeholder name is not a valid key or the access token
    /// cannot form a header.
    pub fn new(config: GitlabConfig) -> StoreResult<Self> {
        validate_key(&config.placeholder_name)?;
        let client = GitlabClient::new(config.repo_id, &config.access_token, &config.api_url)?;
        Ok(Self {
            client,
            branch: config.branch,
            placeholder_name: config.placeholder_name,
            keysmith: Keysmith::new(),
        })
    }

    /// HEAD one object and build its descriptor from the metadata headers.
    async fn head_object_info(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo> {
        let head = self
            .client
            .head_file(&object_path(bucket, key), &self.branch)
            .await?
            .ok_or_else(|| StoreError::NoSuchKey {
                key: key.to_owned(),
            })?;
        Ok(ObjectInfo {
            key: key.to_owned(),
            size: head.size,
            last_modified: Utc::now(),
            etag: head.content_sha256,
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
        })
    }

    /// Fetch object keys under a bucket, page by page, until the last page
    /// or until `is_enough` says the accumulated set already decides the
    /// listing.
    async fn fetch_object_keys(
        &self,
        bucket: &str,
        is_enough: impl Fn(&[String]) -> bool + Send + Sync,
        per_page: u32,
    ) -> StoreResult<Vec<String>> {
        let mut keys: Vec<String> = Vec::new();
        for page in 1..MAX_PAGE {
            let params = TreeParams {
                r#ref: self.branch.clone(),
                path: Some(bucket.to_owned()),
                recursive: Some(true),
                page: Some(page),
                per_page: Some(per_page),
            };
            let tree = self.client.get_tree(&params).await?;
            for item in &tree.items {
                if item.item_type != TreeItemType::Blob {
                    continue;
                }
                match split_path(&item.path) {
                    Some((tree_bucket, key)) => {
                        debug_assert_eq!(tree_bucket, bucket);
                        keys.push(key.to_owned());
                    }
                    None => {
                        debug!(path = %item.path, "skipping blob outside any bucket");
                    }
                }
            }

            if page >= tree.total_pages {
                return Ok(keys);
            }
            if is_enough(&keys) {
                return Ok(keys);
            }
        }
        Ok(keys)
    }

    /// Materialize a listing: fetch enough keys, run the filter, then fill
    /// in real metadata for the emitted contents with batched HEADs.
    async fn collect_objects<L, F>(&self, bucket: &str, filter: F, per_page: u32) -> StoreResult<L>
    where
        L: ListOutcome + Send,
        F: Fn(Vec<ObjectInfo>) -> L + Send + Sync,
    {
        let keys = self
            .fetch_object_keys(
                bucket,
                |keys| filter(skeletal_objects(keys)).is_truncated(),
                per_page,
            )
            .await?;

        let mut outcome = filter(skeletal_objects(&keys));
        let selected: Vec<String> = outcome
            .contents()
            .iter()
            .map(|obj| obj.key.clone())
            .collect();

        let mut objects = Vec::with_capacity(selected.len());
        for batch in selected.chunks(BATCH_SIZE) {
            let heads = futures::future::try_join_all(
                batch.iter().map(|key| self.head_object_info(bucket, key)),
            )
            .await?;
            objects.extend(heads);
        }

        *outcome.contents_mut() = objects;
        Ok(outcome)
    }

    /// Delete one object file; a 400 means the file is already gone and is
    /// treated as success.
    async fn delete_object_at(&self, bucket: &str, key: &str) -> StoreResult<()> {
        let file_path = object_path(bucket, key);
        let params = DeleteFile {
            branch: self.branch.clone(),
            commit_message: format!("delete object {file_path}"),
        };
        let resp = self.client.delete_file(&file_path, &params).await?;
        match resp.status().as_u16() {
            204 => Ok(()),
            400 => {
                let text = resp.text().await.unwrap_or_default();
                info!(bucket, key, response = %text, "delete of absent file treated as success");
                Ok(())
            }
            _ => Err(remote_error(resp).await),
        }
    }

    /// Effective tree page size for a listing with the given `max_keys`.
    fn listing_per_page(max_keys: usize) -> u32 {
        let requested = u32::try_from(max_keys).unwrap_or(u32::MAX);
        requested.max(MIN_PER_PAGE)
    }
}

#[async_trait]
impl ObjectStore for GitlabStore {
    async fn list_buckets(&self) -> StoreResult<Vec<BucketInfo>> {
        let now = Utc::now();
        let mut buckets = Vec::new();
        for page in 1..MAX_PAGE {
            let params = TreeParams {
                r#ref: self.branch.clone(),
                path: None,
                recursive: None,
                page: Some(page),
                per_page: Some(100),
            };
            let tree = self.client.get_tree(&params).await?;
            buckets.extend(
                tree.items
                    .iter()
                    .filter(|item| item.item_type == TreeItemType::Tree)
                    .map(|item| BucketInfo {
                        name: item.name.clone(),
                        creation_date: now,
                    }),
            );
            if page >= tree.total_pages {
                break;
            }
        }
        Ok(buckets)
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        validate_bucket_name(bucket)?;
        let file_path = object_path(bucket, &self.placeholder_name);
        let body = CreateFile {
            branch: self.branch.clone(),
            commit_message: format!("create bucket {bucket}"),
            content: String::new(),
            encoding: "base64",
        };

        let resp = {
            let _guard = self.keysmith.lock(bucket).await;
            self.client.create_file(&file_path, &body).await?
        };
        match resp.status().as_u16() {
            201 => {
                info!(bucket, "bucket created");
                Ok(())
            }
            400 => {
                let text = resp.text().await.unwrap_or_default();
                info!(bucket, response = %text, "create collided with existing bucket");
                Err(StoreError::BucketAlreadyExists {
                    bucket: bucket.to_owned(),
                })
            }
            _ => Err(remote_error(resp).await),
        }
    }

    async fn delete_bucket(&self, bucket: &str) -> StoreResult<()> {
        let _guard = self.keysmith.lock(bucket).await;
        let keys = self
            .fetch_object_keys(bucket, |_| false, DELETE_PER_PAGE)
            .await?;
        for key in &keys {
            self.delete_object_at(bucket, key).await?;
        }
        info!(bucket, objects = keys.len(), "bucket deleted");
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        query: ListObjectsQuery,
    ) -> StoreResult<ListObjectsInfo> {
        let per_page = Self::listing_per_page(query.max_keys);
        let placeholder = self.placeholder_name.clone();
        let filter = move |mut objects: Vec<ObjectInfo>| {
            objects.retain(|obj| obj.key != placeholder);
            filter_objects(
                objects,
                query.prefix.as_deref(),
                query.delimiter.as_deref(),
                query.max_keys,
                query.marker.as_deref(),
                query.encoding_type,
            )
        };

        let _guard = self.keysmith.lock(bucket).await;
        self.collect_objects(bucket, filter, per_page).await
    }

    async fn list_objects_v2(
        &self,
        bucket: &str,
        query: ListObjectsV2Query,
    ) -> StoreResult<ListObjectsV2Info> {
        let per_page = Self::listing_per_page(query.max_keys);
        let placeholder = self.placeholder_name.clone();
        let filter = move |mut objects: Vec<ObjectInfo>| {
            objects.retain(|obj| obj.key != placeholder);
            filter_objects_v2(
                objects,
                query.prefix.as_deref(),
                query.delimiter.as_deref(),
                query.max_keys,
                query.continuation_token.as_deref(),
                query.start_after.as_deref(),
                query.encoding_type,
            )
        };

        let _guard = self.keysmith.lock(bucket).await;
        self.collect_objects(bucket, filter, per_page).await
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Object> {
        if key == self.placeholder_name {
            return Err(StoreError::NoSuchKey {
                key: key.to_owned(),
            });
        }
        let resp = self
            .client
            .get_file(&object_path(bucket, key), &self.branch)
            .await?;
        match resp.status().as_u16() {
            200 => {
                let file: File = resp.json().await?;
                let encoded: String = file
                    .content
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                let data = BASE64.decode(encoded).map_err(|e| StoreError::Remote {
                    status: 200,
                    message: format!("file content is not valid base64: {e}"),
                })?;
                let info = ObjectInfo {
                    key: key.to_owned(),
                    size: data.len() as u64,
                    last_modified: Utc::now(),
                    etag: compute_etag(&data),
                    content_type: DEFAULT_CONTENT_TYPE.to_owned(),
                };
                Ok(Object {
                    data: Bytes::from(data),
                    info,
                })
            }
            404 => Err(StoreError::NoSuchKey {
                key: key.to_owned(),
            }),
            _ => Err(remote_error(resp).await),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> StoreResult<ObjectInfo> {
        validate_key(key)?;
        if key == self.placeholder_name {
            return Err(StoreError::InvalidKey {
                key: key.to_owned(),
                reason: "the placeholder name is reserved".to_owned(),
            });
        }

        let file_path = object_path(bucket, key);
        let body = CreateFile {
            branch: self.branch.clone(),
            commit_message: format!("put object {file_path}"),
            content: BASE64.encode(&data),
            encoding: "base64",
        };

        let _guard = self.keysmith.lock(bucket).await;
        let resp = self.client.create_file(&file_path, &body).await?;
        match resp.status().as_u16() {
            201 => {}
            // The file already exists on the branch; re-put replaces it
            // through the update endpoint.
            400 => {
                debug!(bucket, key, "create conflicted, updating existing file");
                let resp = self.client.update_file(&file_path, &body).await?;
                if !resp.status().is_success() {
                    return Err(remote_error(resp).await);
                }
            }
            _ => return Err(remote_error(resp).await),
        }

        Ok(ObjectInfo {
            key: key.to_owned(),
            size: data.len() as u64,
            last_modified: Utc::now(),
            etag: compute_etag(&data),
            content_type: DEFAULT_CONTENT_TYPE.to_owned(),
        })
    }

    async fn head_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectInfo> {
        if key == self.placeholder_name {
            return Err(StoreError::NoSuchKey {
                key: key.to_owned(),
            });
        }
        self.head_object_info(bucket, key).await
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> StoreResult<()> {
        if key == self.placeholder_name {
            return Ok(());
        }
        let _guard = self.keysmith.lock(bucket).await;
        self.delete_object_at(bucket, key).await
    }
}
