//! S3 request routing: path parsing and operation identification.
//!
//! Requests are path-style only: `/` for the service, `/{bucket}` for
//! bucket operations, `/{bucket}/{key...}` for object operations. The
//! listing API version is selected by the `list-type=2` query parameter.

use http::Method;
use percent_encoding::percent_decode_str;

use boxdrive_model::error::{S3Error, S3ErrorCode};
use boxdrive_model::operations::S3Operation;

/// The result of routing an HTTP request to an S3 operation.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    /// The resolved bucket name, if any.
    pub bucket: Option<String>,
    /// The resolved object key, if any.
    pub key: Option<String>,
    /// The identified S3 operation.
    pub operation: S3Operation,
    /// Parsed query parameters from the request URI.
    pub query_params: Vec<(String, String)>,
}

/// Resolve an HTTP request to a routing context.
///
/// # Errors
///
/// Returns an `S3Error` if the request cannot be routed to a valid
/// operation (unsupported HTTP method for the addressed resource).
pub fn resolve<B>(req: &http::Request<B>) -> Result<RoutingContext, S3Error> {
    let query_params = parse_query_params(req.uri().query().unwrap_or(""));
    let (bucket, key) = parse_path(req.uri().path());
    let operation = identify_operation(req.method(), bucket.is_some(), key.is_some(), &query_params)?;

    Ok(RoutingContext {
        bucket,
        key,
        operation,
        query_params,
    })
}

/// Parse the URI path into an optional bucket and optional key.
///
/// Path format: `/`, `/{bucket}`, or `/{bucket}/{key...}`.
fn parse_path(path: &str) -> (Option<String>, Option<String>) {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        return (None, None);
    }

    match trimmed.find('/') {
        Some(pos) => {
            let bucket = decode_uri_component(&trimmed[..pos]);
            let key_raw = &trimmed[pos + 1..];
            let key = if key_raw.is_empty() {
                None
            } else {
                Some(decode_uri_component(key_raw))
            };
            (Some(bucket), key)
        }
        None => (Some(decode_uri_component(trimmed)), None),
    }
}

/// Decode a percent-encoded URI component.
fn decode_uri_component(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Parse a query string into key-value pairs.
fn parse_query_params(query: &str) -> Vec<(String, String)> {
    if query.is_empty() {
        return Vec::new();
    }

    query
        .split('&')
        .filter(|s| !s.is_empty())
        .map(|pair| match pair.find('=') {
            Some(pos) => (
                decode_uri_component(&pair[..pos]),
                decode_uri_component(&pair[pos + 1..]),
            ),
            None => (decode_uri_component(pair), String::new()),
        })
        .collect()
}

/// Look up a query parameter by name.
pub fn query_value<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Identify the S3 operation from the HTTP method and path structure.
fn identify_operation(
    method: &Method,
    has_bucket: bool,
    has_key: bool,
    query_params: &[(String, String)],
) -> Result<S3Operation, S3Error> {
    match (method, has_bucket, has_key) {
        // Service level.
        (&Method::GET, false, false) => Ok(S3Operation::ListBuckets),
        (_, false, false) => Err(S3Error::with_message(
            S3ErrorCode::MethodNotAllowed,
            "Only GET is allowed at the service level",
        )),

        // Bucket level.
        (&Method::GET, true, false) => {
            if query_value(query_params, "list-type") == Some("2") {
                Ok(S3Operation::ListObjectsV2)
            } else {
                Ok(S3Operation::ListObjects)
            }
        }
        (&Method::PUT, true, false) => Ok(S3Operation::CreateBucket),
        (&Method::DELETE, true, false) => Ok(S3Operation::DeleteBucket),
        (method, true, false) => Err(S3Error::method_not_allowed(method.as_str())),

        // Object level.
        (&Method::GET, true, true) => Ok(S3Operation::GetObject),
        (&Method::HEAD, true, true) => Ok(S3Operation::HeadObject),
        (&Method::PUT, true, true) => Ok(S3Operation::PutObject),
        (&Method::DELETE, true, true) => Ok(S3Operation::DeleteObject),
        (method, true, true) => Err(S3Error::method_not_allowed(method.as_str())),

        // A key without a bucket cannot be produced by parse_path.
        (_, false, true) => Err(S3Error::with_message(
            S3ErrorCode::InvalidArgument,
            "Object key specified without bucket",
        )),
    }
}
