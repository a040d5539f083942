//! End-to-end tests for the BoxDrive S3 surface.
//!
//! These drive the full router + facade pipeline over a `MemoryStore`
//! in-process: requests are built as `http::Request<Bytes>` and handed to
//! the same entry point the hyper service uses, so no sockets are involved
//! and `cargo test` exercises everything.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;

use boxdrive_core::MemoryStore;
use boxdrive_http::S3Facade;
use boxdrive_http::service::handle_request;

/// An in-process BoxDrive instance over a fresh `MemoryStore`.
pub struct TestServer {
    facade: S3Facade,
}

/// A collected response: status, headers, and the full body.
#[derive(Debug)]
pub struct TestResponse {
    /// Response status.
    pub status: http::StatusCode,
    /// Response headers.
    pub headers: http::HeaderMap,
    /// Collected response body.
    pub body: Bytes,
}

impl TestResponse {
    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).expect("response body should be UTF-8")
    }

    /// A header value as a string, if present.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl Default for TestServer {
    fn default() -> Self {
        Self::new()
    }
}

impl TestServer {
    /// Create a server over an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            facade: S3Facade::new(Arc::new(MemoryStore::new())),
        }
    }

    /// Send one request through the full pipeline.
    pub async fn send(
        &self,
        method: http::Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> TestResponse {
        let mut builder = http::Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let req = builder
            .body(Bytes::copy_from_slice(body))
            .expect("request should build");

        let response = handle_request(&self.facade, req, "test-request").await;
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();
        TestResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// `GET` shorthand.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(http::Method::GET, uri, &[], b"").await
    }

    /// `PUT` shorthand with a body.
    pub async fn put(&self, uri: &str, body: &[u8]) -> TestResponse {
        self.send(http::Method::PUT, uri, &[], body).await
    }

    /// `DELETE` shorthand.
    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send(http::Method::DELETE, uri, &[], b"").await
    }

    /// `HEAD` shorthand.
    pub async fn head(&self, uri: &str) -> TestResponse {
        self.send(http::Method::HEAD, uri, &[], b"").await
    }
}

/// Extract every occurrence of `<tag>...</tag>` from an XML body, in order.
#[must_use]
pub fn xml_values(body: &str, tag: &str) -> Vec<String> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    let mut values = Vec::new();
    let mut rest = body;
    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        let Some(end) = after.find(&close) else { break };
        values.push(after[..end].to_owned());
        rest = &after[end + close.len()..];
    }
    values
}

/// Extract the single occurrence of `<tag>...</tag>`, if any.
#[must_use]
pub fn xml_value(body: &str, tag: &str) -> Option<String> {
    xml_values(body, tag).into_iter().next()
}

mod test_bucket;
mod test_list;
mod test_object;
