//! The S3 facade: operation handlers over an [`ObjectStore`].
//!
//! Translates store results into protocol responses (status, headers, XML)
//! and store errors into wire errors. Delete operations are idempotent at
//! this layer: a missing bucket or key is logged and answered with 204.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{error, info};

use boxdrive_core::store::{ListObjectsQuery, ListObjectsV2Query};
use boxdrive_core::{ObjectStore, StoreError};
use boxdrive_model::S3Operation;
use boxdrive_model::error::{S3Error, S3ErrorCode};
use boxdrive_model::output::{ListBucketsOutput, ListObjectsOutput, ListObjectsV2Output};
use boxdrive_xml::S3Serialize;

use crate::body::S3ResponseBody;
use crate::dispatch::S3Handler;
use crate::request::{
    effective_max_keys, header_str, list_objects_input, list_objects_v2_input, parse_range,
};
use crate::response::{
    basename, build_response, no_content_response, object_header_builder, quote_etag, xml_response,
};
use crate::router::RoutingContext;
use crate::token::{decode_continuation_token, encode_continuation_token};

type HandlerResponse = Result<http::Response<S3ResponseBody>, S3Error>;

/// S3 facade over a backing store.
pub struct S3Facade {
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for S3Facade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Facade").finish_non_exhaustive()
    }
}

impl S3Facade {
    /// Create a facade over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }
}

/// Map a store error onto the wire error taxonomy.
fn store_error_to_s3(err: StoreError) -> S3Error {
    match err {
        StoreError::NoSuchBucket { bucket } => S3Error::no_such_bucket(bucket),
        StoreError::NoSuchKey { key } => S3Error::no_such_key(key),
        StoreError::BucketAlreadyExists { bucket } => S3Error::bucket_already_exists(bucket),
        StoreError::InvalidBucketName { name, reason } => {
            S3Error::with_message(S3ErrorCode::InvalidBucketName, reason).with_resource(name)
        }
        StoreError::InvalidKey { key, reason } => {
            S3Error::invalid_argument(reason).with_resource(key)
        }
        StoreError::Remote { status, message } => {
            error!(status, %message, "remote backend failure");
            S3Error::internal_error(format!("remote backend returned status {status}"))
        }
        StoreError::Transport(e) => {
            error!(error = %e, "remote backend unreachable");
            S3Error::internal_error("remote backend unreachable")
        }
    }
}

/// Serialize an output as XML, mapping failures to an internal error.
fn serialize_xml<T: S3Serialize>(root: &str, value: &T) -> Result<Vec<u8>, S3Error> {
    boxdrive_xml::to_xml(root, value)
        .map_err(|e| S3Error::internal_error(format!("XML serialization failed: {e}")))
}

fn require_bucket(ctx: &RoutingContext) -> Result<String, S3Error> {
    ctx.bucket
        .clone()
        .ok_or_else(|| S3Error::internal_error("routing produced no bucket for this operation"))
}

fn require_key(ctx: &RoutingContext) -> Result<String, S3Error> {
    ctx.key
        .clone()
        .ok_or_else(|| S3Error::internal_error("routing produced no key for this operation"))
}

impl S3Facade {
    async fn handle_list_buckets(&self) -> HandlerResponse {
        let buckets = self
            .store
            .list_buckets()
            .await
            .map_err(store_error_to_s3)?;
        let output = ListBucketsOutput { buckets };
        xml_response(serialize_xml("ListAllMyBucketsResult", &output)?)
    }

    async fn handle_create_bucket(&self, bucket: &str) -> HandlerResponse {
        self.store
            .create_bucket(bucket)
            .await
            .map_err(store_error_to_s3)?;
        build_response(
            http::Response::builder()
                .status(http::StatusCode::OK)
                .header("Location", format!("/{bucket}")),
            S3ResponseBody::empty(),
        )
    }

    async fn handle_delete_bucket(&self, bucket: &str) -> HandlerResponse {
        match self.store.delete_bucket(bucket).await {
            Ok(()) => {}
            Err(StoreError::NoSuchBucket { .. }) => {
                info!(bucket, "delete of absent bucket");
            }
            Err(e) => return Err(store_error_to_s3(e)),
        }
        no_content_response()
    }

    async fn handle_list_objects(&self, bucket: String, ctx: &RoutingContext) -> HandlerResponse {
        let input = list_objects_input(bucket, ctx)?;
        let (wire_max_keys, max_keys) = effective_max_keys(input.max_keys);

        let info = self
            .store
            .list_objects(
                &input.bucket,
                ListObjectsQuery {
                    prefix: input.prefix.clone(),
                    delimiter: input.delimiter.clone(),
                    max_keys,
                    marker: input.marker.clone(),
                    encoding_type: input.encoding_type,
                },
            )
            .await
            .map_err(store_error_to_s3)?;

        let next_marker = if info.is_truncated {
            Some(info.next_marker)
        } else {
            None
        };
        let output = ListObjectsOutput {
            name: input.bucket,
            prefix: input.prefix.unwrap_or_default(),
            marker: input.marker,
            delimiter: input.delimiter,
            max_keys: wire_max_keys,
            is_truncated: info.is_truncated,
            next_marker,
            encoding_type: input.encoding_type,
            contents: info.objects,
            common_prefixes: info.common_prefixes,
        };
        xml_response(serialize_xml("ListBucketResult", &output)?)
    }

    async fn handle_list_objects_v2(
        &self,
        bucket: String,
        ctx: &RoutingContext,
    ) -> HandlerResponse {
        let input = list_objects_v2_input(bucket, ctx)?;
        let decoded_token = input
            .continuation_token
            .as_deref()
            .map(decode_continuation_token)
            .transpose()?;
        let (wire_max_keys, max_keys) = effective_max_keys(input.max_keys);

        let info = self
            .store
            .list_objects_v2(
                &input.bucket,
                ListObjectsV2Query {
                    prefix: input.prefix.clone(),
                    delimiter: input.delimiter.clone(),
                    max_keys,
                    continuation_token: decoded_token,
                    start_after: input.start_after.clone(),
                    encoding_type: input.encoding_type,
                },
            )
            .await
            .map_err(store_error_to_s3)?;

        // The next-page cursor follows the v1 rule: the last common prefix
        // if any were produced, else the last content key.
        let next_continuation_token = if info.is_truncated {
            info.common_prefixes
                .last()
                .cloned()
                .or_else(|| info.objects.last().map(|obj| obj.key.clone()))
                .map(|cursor| encode_continuation_token(&cursor))
        } else {
            None
        };

        let key_count = i32::try_from(info.objects.len() + info.common_prefixes.len())
            .unwrap_or(i32::MAX);
        let output = ListObjectsV2Output {
            name: input.bucket,
            prefix: input.prefix.unwrap_or_default(),
            delimiter: input.delimiter,
            max_keys: wire_max_keys,
            key_count,
            is_truncated: info.is_truncated,
            continuation_token: input.continuation_token,
            next_continuation_token,
            start_after: input.start_after,
            encoding_type: input.encoding_type,
            contents: info.objects,
            common_prefixes: info.common_prefixes,
        };
        xml_response(serialize_xml("ListBucketResult", &output)?)
    }

    async fn handle_get_object(
        &self,
        bucket: &str,
        key: &str,
        parts: &http::request::Parts,
    ) -> HandlerResponse {
        let object = self
            .store
            .get_object(bucket, key)
            .await
            .map_err(store_error_to_s3)?;

        let total = object.data.len();
        let range = parse_range(header_str(parts, "range").as_deref(), total)?;
        let (status, data, content_range) = match range {
            Some((start, end)) => (
                http::StatusCode::PARTIAL_CONTENT,
                object.data.slice(start..=end),
                Some(format!("bytes {start}-{end}/{total}")),
            ),
            None => (http::StatusCode::OK, object.data.clone(), None),
        };

        let mut builder = object_header_builder(status, &object.info, data.len() as u64).header(
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", basename(key)),
        );
        if let Some(content_range) = content_range {
            builder = builder.header("Content-Range", content_range);
        }
        build_response(builder, S3ResponseBody::from_bytes(data))
    }

    async fn handle_head_object(&self, bucket: &str, key: &str) -> HandlerResponse {
        let info = self
            .store
            .head_object(bucket, key)
            .await
            .map_err(store_error_to_s3)?;
        build_response(
            object_header_builder(http::StatusCode::OK, &info, info.size),
            S3ResponseBody::empty(),
        )
    }

    async fn handle_put_object(
        &self,
        bucket: &str,
        key: &str,
        parts: &http::request::Parts,
        body: Bytes,
    ) -> HandlerResponse {
        let content_type = header_str(parts, "content-type");
        let info = self
            .store
            .put_object(bucket, key, body, content_type.as_deref())
            .await
            .map_err(store_error_to_s3)?;
        build_response(
            http::Response::builder()
                .status(http::StatusCode::OK)
                .header("ETag", quote_etag(&info.etag)),
            S3ResponseBody::empty(),
        )
    }

    async fn handle_delete_object(&self, bucket: &str, key: &str) -> HandlerResponse {
        match self.store.delete_object(bucket, key).await {
            Ok(()) => {}
            Err(StoreError::NoSuchBucket { .. }) => {
                info!(bucket, key, "delete in absent bucket");
            }
            Err(StoreError::NoSuchKey { .. }) => {
                info!(bucket, key, "delete of absent object");
            }
            Err(e) => return Err(store_error_to_s3(e)),
        }
        no_content_response()
    }
}

impl S3Handler for S3Facade {
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: Bytes,
        ctx: RoutingContext,
    ) -> Pin<Box<dyn Future<Output = HandlerResponse> + Send + '_>> {
        Box::pin(async move {
            match op {
                S3Operation::ListBuckets => self.handle_list_buckets().await,
                S3Operation::CreateBucket => {
                    self.handle_create_bucket(&require_bucket(&ctx)?).await
                }
                S3Operation::DeleteBucket => {
                    self.handle_delete_bucket(&require_bucket(&ctx)?).await
                }
                S3Operation::ListObjects => {
                    self.handle_list_objects(require_bucket(&ctx)?, &ctx).await
                }
                S3Operation::ListObjectsV2 => {
                    self.handle_list_objects_v2(require_bucket(&ctx)?, &ctx)
                        .await
                }
                S3Operation::GetObject => {
                    self.handle_get_object(&require_bucket(&ctx)?, &require_key(&ctx)?, &parts)
                        .await
                }
                S3Operation::HeadObject => {
                    self.handle_head_object(&require_bucket(&ctx)?, &require_key(&ctx)?)
                        .await
                }
                S3Operation::PutObject => {
                    self.handle_put_object(
                        &require_bucket(&ctx)?,
                        &require_key(&ctx)?,
                        &parts,
                        body,
                    )
                    .await
                }
                S3Operation::DeleteObject => {
                    self.handle_delete_object(&require_bucket(&ctx)?, &require_key(&ctx)?)
                        .await
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use boxdrive_core::MemoryStore;

    use super::*;

    fn facade() -> S3Facade {
        S3Facade::new(Arc::new(MemoryStore::new()))
    }

    fn empty_parts() -> http::request::Parts {
        let (parts, ()) = http::Request::builder()
            .method(http::Method::GET)
            .uri("/")
            .body(())
            .expect("valid request")
            .into_parts();
        parts
    }

    #[tokio::test]
    async fn test_should_return_etag_header_on_put() {
        let facade = facade();
        facade.handle_create_bucket("bkt").await.expect("create");

        let resp = facade
            .handle_put_object("bkt", "k", &empty_parts(), Bytes::from_static(b"hello"))
            .await
            .expect("put");
        assert_eq!(resp.status(), http::StatusCode::OK);
        let etag = resp
            .headers()
            .get("ETag")
            .and_then(|v| v.to_str().ok())
            .expect("etag header");
        assert!(etag.starts_with('"') && etag.ends_with('"'));
    }

    #[tokio::test]
    async fn test_should_answer_deletes_idempotently() {
        let facade = facade();

        let resp = facade
            .handle_delete_bucket("never-created")
            .await
            .expect("idempotent");
        assert_eq!(resp.status(), http::StatusCode::NO_CONTENT);

        facade.handle_create_bucket("bkt").await.expect("create");
        let resp = facade
            .handle_delete_object("bkt", "missing")
            .await
            .expect("idempotent");
        assert_eq!(resp.status(), http::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_should_conflict_on_duplicate_bucket() {
        let facade = facade();
        facade.handle_create_bucket("bkt").await.expect("create");

        let err = facade.handle_create_bucket("bkt").await.unwrap_err();
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_should_serve_byte_ranges() {
        let facade = facade();
        facade.handle_create_bucket("bkt").await.expect("create");
        facade
            .handle_put_object(
                "bkt",
                "f.txt",
                &empty_parts(),
                Bytes::from_static(b"Hello, World! This is a test file."),
            )
            .await
            .expect("put");

        let (parts, ()) = http::Request::builder()
            .method(http::Method::GET)
            .uri("/bkt/f.txt")
            .header("Range", "bytes=0-4")
            .body(())
            .expect("valid request")
            .into_parts();
        let resp = facade
            .handle_get_object("bkt", "f.txt", &parts)
            .await
            .expect("ranged get");
        assert_eq!(resp.status(), http::StatusCode::PARTIAL_CONTENT);
        assert_eq!(
            resp.headers()
                .get("Content-Range")
                .and_then(|v| v.to_str().ok()),
            Some("bytes 0-4/34")
        );
        assert_eq!(
            resp.headers()
                .get("Content-Length")
                .and_then(|v| v.to_str().ok()),
            Some("5")
        );
    }
}
