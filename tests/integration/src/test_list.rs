//! Listing tests: prefix, delimiter, pagination, encoding, v2 tokens.

#[cfg(test)]
mod tests {
    use crate::{TestServer, xml_value, xml_values};

    async fn seeded_server(keys: &[&str]) -> TestServer {
        let server = TestServer::new();
        server.put("/bkt", b"").await;
        for key in keys {
            server.put(&format!("/bkt/{key}"), b"data").await;
        }
        server
    }

    #[tokio::test]
    async fn test_should_list_with_prefix() {
        let server = seeded_server(&["file1.txt", "file2.txt", "folder/file3.txt"]).await;

        let resp = server.get("/bkt?prefix=folder%2F").await;
        assert_eq!(resp.status, http::StatusCode::OK);

        let body = resp.text();
        assert_eq!(xml_values(body, "Key"), ["folder/file3.txt"]);
        assert_eq!(xml_value(body, "Prefix").as_deref(), Some("folder/"));
        assert_eq!(xml_value(body, "IsTruncated").as_deref(), Some("false"));
    }

    #[tokio::test]
    async fn test_should_roll_up_common_prefixes() {
        let server = seeded_server(&["a/1", "a/2", "b/1"]).await;

        let resp = server.get("/bkt?delimiter=%2F").await;
        let body = resp.text();
        assert!(xml_values(body, "Key").is_empty());
        // The first <Prefix> echoes the request parameter; the rolled-up
        // prefixes follow inside <CommonPrefixes>.
        assert_eq!(xml_values(body, "Prefix"), ["", "a/", "b/"]);
    }

    #[tokio::test]
    async fn test_should_paginate_v1_with_markers() {
        let server = seeded_server(&["k1", "k2", "k3", "k4", "k5"]).await;

        let page1 = server.get("/bkt?max-keys=2").await;
        let body = page1.text();
        assert_eq!(xml_values(body, "Key"), ["k1", "k2"]);
        assert_eq!(xml_value(body, "IsTruncated").as_deref(), Some("true"));
        assert_eq!(xml_value(body, "NextMarker").as_deref(), Some("k2"));

        let page2 = server.get("/bkt?max-keys=2&marker=k2").await;
        let body = page2.text();
        assert_eq!(xml_values(body, "Key"), ["k3", "k4"]);
        assert_eq!(xml_value(body, "NextMarker").as_deref(), Some("k4"));

        let page3 = server.get("/bkt?max-keys=2&marker=k4").await;
        let body = page3.text();
        assert_eq!(xml_values(body, "Key"), ["k5"]);
        assert_eq!(xml_value(body, "IsTruncated").as_deref(), Some("false"));
        assert!(xml_value(body, "NextMarker").is_none());
    }

    #[tokio::test]
    async fn test_should_paginate_v2_with_continuation_tokens() {
        let server = seeded_server(&["k1", "k2", "k3", "k4", "k5"]).await;

        let page1 = server.get("/bkt?list-type=2&max-keys=2").await;
        let body = page1.text();
        assert_eq!(xml_values(body, "Key"), ["k1", "k2"]);
        assert_eq!(xml_value(body, "KeyCount").as_deref(), Some("2"));
        assert_eq!(xml_value(body, "IsTruncated").as_deref(), Some("true"));
        let token = xml_value(body, "NextContinuationToken").expect("token");

        let page2 = server
            .get(&format!(
                "/bkt?list-type=2&max-keys=2&continuation-token={token}"
            ))
            .await;
        let body = page2.text();
        assert_eq!(xml_values(body, "Key"), ["k3", "k4"]);
        let token = xml_value(body, "NextContinuationToken").expect("token");

        let page3 = server
            .get(&format!(
                "/bkt?list-type=2&max-keys=2&continuation-token={token}"
            ))
            .await;
        let body = page3.text();
        assert_eq!(xml_values(body, "Key"), ["k5"]);
        assert_eq!(xml_value(body, "IsTruncated").as_deref(), Some("false"));
        assert!(xml_value(body, "NextContinuationToken").is_none());
    }

    #[tokio::test]
    async fn test_should_list_v2_with_start_after() {
        let server = seeded_server(&["a", "b", "c"]).await;

        let resp = server.get("/bkt?list-type=2&start-after=a").await;
        let body = resp.text();
        assert_eq!(xml_values(body, "Key"), ["b", "c"]);
        assert_eq!(xml_value(body, "StartAfter").as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn test_should_reject_bad_continuation_token() {
        let server = seeded_server(&["a"]).await;

        let resp = server
            .get("/bkt?list-type=2&continuation-token=%21%21not-base64%21%21")
            .await;
        assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
        assert_eq!(
            xml_value(resp.text(), "Code").as_deref(),
            Some("InvalidArgument")
        );
    }

    #[tokio::test]
    async fn test_should_url_encode_listing_when_requested() {
        let server = seeded_server(&["dir%20name/file.txt", "plain.txt"]).await;

        let resp = server
            .get("/bkt?delimiter=%2F&encoding-type=url")
            .await;
        let body = resp.text();
        assert_eq!(xml_values(body, "Key"), ["plain.txt"]);
        assert!(body.contains("<CommonPrefixes><Prefix>dir%20name/</Prefix></CommonPrefixes>"));
        assert_eq!(xml_value(body, "EncodingType").as_deref(), Some("url"));
    }

    #[tokio::test]
    async fn test_should_list_empty_bucket() {
        let server = seeded_server(&[]).await;

        let resp = server.get("/bkt").await;
        assert_eq!(resp.status, http::StatusCode::OK);
        assert!(xml_values(resp.text(), "Key").is_empty());

        let resp = server.get("/bkt?list-type=2").await;
        assert_eq!(xml_value(resp.text(), "KeyCount").as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn test_should_truncate_at_zero_max_keys() {
        let server = seeded_server(&["a", "b"]).await;

        let resp = server.get("/bkt?max-keys=0").await;
        let body = resp.text();
        assert!(xml_values(body, "Key").is_empty());
        assert_eq!(xml_value(body, "IsTruncated").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn test_should_fail_listing_missing_bucket() {
        let server = TestServer::new();

        let resp = server.get("/missing-bucket").await;
        assert_eq!(resp.status, http::StatusCode::NOT_FOUND);
        assert_eq!(
            xml_value(resp.text(), "Code").as_deref(),
            Some("NoSuchBucket")
        );
    }

    #[tokio::test]
    async fn test_should_reject_bad_max_keys() {
        let server = seeded_server(&["a"]).await;

        let resp = server.get("/bkt?max-keys=abc").await;
        assert_eq!(resp.status, http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_should_handle_concurrent_puts_and_listing() {
        let server = std::sync::Arc::new(seeded_server(&[]).await);

        let mut tasks = Vec::new();
        for i in 0..10 {
            let server = std::sync::Arc::clone(&server);
            tasks.push(tokio::spawn(async move {
                let resp = server
                    .put(&format!("/bkt/concurrent-{i:02}"), b"data")
                    .await;
                assert_eq!(resp.status, http::StatusCode::OK);
            }));
        }
        for task in tasks {
            task.await.expect("put task");
        }

        let resp = server.get("/bkt").await;
        assert_eq!(xml_values(resp.text(), "Key").len(), 10);
    }
}
