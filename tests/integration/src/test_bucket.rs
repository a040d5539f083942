//! Bucket lifecycle tests.

#[cfg(test)]
mod tests {
    use crate::{TestServer, xml_value, xml_values};

    #[tokio::test]
    async fn test_should_create_bucket_with_location_header() {
        let server = TestServer::new();

        let resp = server.put("/photos", b"").await;
        assert_eq!(resp.status, http::StatusCode::OK);
        assert_eq!(resp.header("Location"), Some("/photos"));
    }

    #[tokio::test]
    async fn test_should_conflict_on_duplicate_bucket() {
        let server = TestServer::new();
        server.put("/photos", b"").await;

        let resp = server.put("/photos", b"").await;
        assert_eq!(resp.status, http::StatusCode::CONFLICT);
        assert_eq!(
            xml_value(resp.text(), "Code").as_deref(),
            Some("BucketAlreadyExists")
        );
    }

    #[tokio::test]
    async fn test_should_reject_invalid_bucket_name() {
        let server = TestServer::new();

        let resp = server.put("/UPPERCASE", b"").await;
        assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            xml_value(resp.text(), "Code").as_deref(),
            Some("InvalidBucketName")
        );
    }

    #[tokio::test]
    async fn test_should_list_buckets_with_fixed_owner() {
        let server = TestServer::new();
        server.put("/alpha", b"").await;
        server.put("/beta", b"").await;

        let resp = server.get("/").await;
        assert_eq!(resp.status, http::StatusCode::OK);
        assert_eq!(resp.header("Content-Type"), Some("application/xml"));

        let body = resp.text();
        assert!(body.contains("<ListAllMyBucketsResult"));
        assert_eq!(xml_values(body, "Name"), ["alpha", "beta"]);
        assert_eq!(xml_value(body, "ID").as_deref(), Some("boxdrive"));
        assert_eq!(xml_value(body, "DisplayName").as_deref(), Some("BoxDrive"));
    }

    #[tokio::test]
    async fn test_should_delete_bucket_idempotently() {
        let server = TestServer::new();
        server.put("/photos", b"").await;

        let resp = server.delete("/photos").await;
        assert_eq!(resp.status, http::StatusCode::NO_CONTENT);

        // Deleting an absent bucket is still 204.
        let resp = server.delete("/photos").await;
        assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
        let resp = server.delete("/missing-bucket").await;
        assert_eq!(resp.status, http::StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_should_remove_objects_with_bucket() {
        let server = TestServer::new();
        server.put("/photos", b"").await;
        server.put("/photos/cat.jpg", b"meow").await;

        server.delete("/photos").await;
        let resp = server.get("/photos/cat.jpg").await;
        assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
        assert_eq!(
            xml_value(resp.text(), "Code").as_deref(),
            Some("NoSuchBucket")
        );
    }

    #[tokio::test]
    async fn test_should_answer_health_probe() {
        let server = TestServer::new();
        let resp = server.get("/_health").await;
        assert_eq!(resp.status, http::StatusCode::OK);
        assert!(resp.text().contains("\"status\":\"running\""));
    }
}
