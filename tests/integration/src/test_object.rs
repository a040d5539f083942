//! Object CRUD, headers, and range tests.

#[cfg(test)]
mod tests {
    use crate::{TestServer, xml_value};

    #[tokio::test]
    async fn test_should_put_and_get_object() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;

        let put = server
            .send(
                http::Method::PUT,
                "/bkt/hello.txt",
                &[("Content-Type", "text/plain")],
                b"Hello, World!",
            )
            .await;
        assert_eq!(put.status, http::StatusCode::OK);
        let etag = put.header("ETag").expect("ETag header").to_owned();
        assert!(etag.starts_with('"') && etag.ends_with('"'));

        let get = server.get("/bkt/hello.txt").await;
        assert_eq!(get.status, http::StatusCode::OK);
        assert_eq!(get.body.as_ref(), b"Hello, World!");
        assert_eq!(get.header("Content-Type"), Some("text/plain"));
        assert_eq!(get.header("Content-Length"), Some("13"));
        assert_eq!(get.header("ETag"), Some(etag.as_str()));
        assert_eq!(get.header("Accept-Ranges"), Some("bytes"));
        assert_eq!(
            get.header("Content-Disposition"),
            Some("attachment; filename=\"hello.txt\"")
        );
        let last_modified = get.header("Last-Modified").expect("Last-Modified header");
        assert!(last_modified.ends_with("GMT"));
    }

    #[tokio::test]
    async fn test_should_serve_byte_range() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;
        server
            .put("/bkt/f.txt", b"Hello, World! This is a test file.")
            .await;

        let resp = server
            .send(
                http::Method::GET,
                "/bkt/f.txt",
                &[("Range", "bytes=0-4")],
                b"",
            )
            .await;
        assert_eq!(resp.status, http::StatusCode::PARTIAL_CONTENT);
        assert_eq!(resp.body.as_ref(), b"Hello");
        assert_eq!(resp.header("Content-Range"), Some("bytes 0-4/34"));
        assert_eq!(resp.header("Content-Length"), Some("5"));
    }

    #[tokio::test]
    async fn test_should_reject_unsatisfiable_range() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;
        server.put("/bkt/f.txt", b"short").await;

        let resp = server
            .send(
                http::Method::GET,
                "/bkt/f.txt",
                &[("Range", "bytes=100-200")],
                b"",
            )
            .await;
        assert_eq!(resp.status, http::StatusCode::RANGE_NOT_SATISFIABLE);
    }

    #[tokio::test]
    async fn test_should_head_object_without_body() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;
        let put = server.put("/bkt/k", b"hello").await;

        let head = server.head("/bkt/k").await;
        assert_eq!(head.status, http::StatusCode::OK);
        assert!(head.body.is_empty());
        assert_eq!(head.header("Content-Length"), Some("5"));
        assert_eq!(head.header("ETag"), put.header("ETag"));
    }

    #[tokio::test]
    async fn test_should_replace_on_reput() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;

        let first = server.put("/bkt/k", b"one").await;
        let second = server.put("/bkt/k", b"two").await;
        assert_ne!(first.header("ETag"), second.header("ETag"));

        let get = server.get("/bkt/k").await;
        assert_eq!(get.body.as_ref(), b"two");
    }

    #[tokio::test]
    async fn test_should_default_content_type() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;
        server.put("/bkt/k", b"data").await;

        let get = server.get("/bkt/k").await;
        assert_eq!(get.header("Content-Type"), Some("application/octet-stream"));
    }

    #[tokio::test]
    async fn test_should_return_not_found_for_missing_object() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;

        let get = server.get("/bkt/missing").await;
        assert_eq!(get.status, http::StatusCode::NOT_FOUND);
        assert_eq!(xml_value(get.text(), "Code").as_deref(), Some("NoSuchKey"));

        let head = server.head("/bkt/missing").await;
        assert_eq!(head.status, http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_should_reject_put_into_absent_bucket() {
        let server = TestServer::new();

        let resp = server.put("/never-created/k", b"data").await;
        assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
        assert_eq!(
            xml_value(resp.text(), "Code").as_deref(),
            Some("NoSuchBucket")
        );
    }

    #[tokio::test]
    async fn test_should_delete_object_idempotently() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;
        server.put("/bkt/k", b"data").await;

        let resp = server.delete("/bkt/k").await;
        assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
        assert_eq!(server.get("/bkt/k").await.status, http::StatusCode::NOT_FOUND);

        // Deleting again, or deleting a key that never existed, is still 204.
        let resp = server.delete("/bkt/k").await;
        assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
        let resp = server.delete("/bkt/missing").await;
        assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_should_handle_nested_and_encoded_keys() {
        let server = TestServer::new();
        server.put("/bkt", b"").await;

        let put = server.put("/bkt/a/b/c%20d.txt", b"nested").await;
        assert_eq!(put.status, http::StatusCode::OK);

        let get = server.get("/bkt/a/b/c%20d.txt").await;
        assert_eq!(get.status, http::StatusCode::OK);
        assert_eq!(get.body.as_ref(), b"nested");
        assert_eq!(
            get.header("Content-Disposition"),
            Some("attachment; filename=\"c d.txt\"")
        );
    }
}
