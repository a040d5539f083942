//! Building HTTP responses from operation results.

use bytes::Bytes;
use http::header::HeaderValue;

use boxdrive_model::error::S3Error;
use boxdrive_model::types::ObjectInfo;

use crate::body::S3ResponseBody;

/// Format a timestamp as an HTTP date (RFC 1123 with the `GMT` literal).
#[must_use]
pub fn format_http_date(dt: &chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Wrap an etag in the double quotes the wire format requires.
#[must_use]
pub fn quote_etag(etag: &str) -> String {
    format!("\"{etag}\"")
}

/// The filename part of a key, for `Content-Disposition`.
#[must_use]
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Build a 200 response with an XML body.
pub fn xml_response(xml: Vec<u8>) -> Result<http::Response<S3ResponseBody>, S3Error> {
    build_response(
        http::Response::builder()
            .status(http::StatusCode::OK)
            .header("Content-Type", "application/xml"),
        S3ResponseBody::from_xml(xml),
    )
}

/// Build an empty 204 response.
pub fn no_content_response() -> Result<http::Response<S3ResponseBody>, S3Error> {
    build_response(
        http::Response::builder().status(http::StatusCode::NO_CONTENT),
        S3ResponseBody::empty(),
    )
}

/// Attach the common object metadata headers shared by GET and HEAD:
/// `Content-Length`, `ETag`, `Last-Modified`, `Content-Type`, and
/// `Accept-Ranges`.
pub fn object_header_builder(
    status: http::StatusCode,
    info: &ObjectInfo,
    content_length: u64,
) -> http::response::Builder {
    http::Response::builder()
        .status(status)
        .header("Content-Length", content_length)
        .header("ETag", quote_etag(&info.etag))
        .header("Last-Modified", format_http_date(&info.last_modified))
        .header("Content-Type", &info.content_type)
        .header("Accept-Ranges", "bytes")
}

/// Build a response from a builder, converting build errors to `S3Error`.
pub fn build_response(
    builder: http::response::Builder,
    body: S3ResponseBody,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    builder
        .body(body)
        .map_err(|e| S3Error::internal_error(format!("failed to build HTTP response: {e}")))
}

/// Convert an `S3Error` into an HTTP error response with an XML body.
#[must_use]
pub fn error_to_response(err: &S3Error, request_id: &str) -> http::Response<S3ResponseBody> {
    let xml_bytes = boxdrive_xml::error_to_xml(
        err.code.as_str(),
        &err.message,
        err.resource.as_deref(),
        request_id,
    );

    let body = S3ResponseBody::from_bytes(Bytes::from(xml_bytes));
    http::Response::builder()
        .status(err.status_code)
        .header("Content-Type", HeaderValue::from_static("application/xml"))
        .body(body)
        .unwrap_or_else(|_| {
            http::Response::builder()
                .status(http::StatusCode::INTERNAL_SERVER_ERROR)
                .body(S3ResponseBody::empty())
                .expect("static response should be valid")
        })
}
