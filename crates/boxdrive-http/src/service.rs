//! The hyper `Service` tying routing, dispatch, and response formatting
//! together.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::Service;
use tracing::{debug, error, warn};
use uuid::Uuid;

use boxdrive_model::error::S3Error;

use crate::body::S3ResponseBody;
use crate::dispatch::{S3Handler, dispatch_operation};
use crate::response::error_to_response;
use crate::router;

/// The BoxDrive HTTP service.
///
/// Processes each request through the full pipeline: health-probe
/// interception, routing, dispatch to the [`S3Handler`], error formatting,
/// and common response headers.
#[derive(Debug)]
pub struct S3HttpService<H: S3Handler> {
    handler: Arc<H>,
}

impl<H: S3Handler> S3HttpService<H> {
    /// Create a service around the given handler.
    #[must_use]
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Create a service from an already shared handler.
    #[must_use]
    pub fn from_shared(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

impl<H: S3Handler> Clone for S3HttpService<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: S3Handler> Service<http::Request<Incoming>> for S3HttpService<H> {
    type Response = http::Response<S3ResponseBody>;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, req: http::Request<Incoming>) -> Self::Future {
        let handler = Arc::clone(&self.handler);

        Box::pin(async move {
            let request_id = Uuid::new_v4().to_string();

            let (parts, incoming) = req.into_parts();
            let body = match incoming.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => {
                    error!(error = %e, request_id, "failed to collect request body");
                    let err = S3Error::internal_error("Failed to read request body");
                    return Ok(add_common_headers(
                        error_to_response(&err, &request_id),
                        &request_id,
                    ));
                }
            };

            let req = http::Request::from_parts(parts, body);
            let response = handle_request(handler.as_ref(), req, &request_id).await;
            Ok(add_common_headers(response, &request_id))
        })
    }
}

/// Process one buffered request through the S3 pipeline.
///
/// Public so in-process tests can drive the full stack without sockets.
pub async fn handle_request<H: S3Handler>(
    handler: &H,
    req: http::Request<Bytes>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    debug!(%method, %uri, request_id, "processing S3 request");

    if is_health_check(&method, uri.path()) {
        return health_check_response();
    }

    let ctx = match router::resolve(&req) {
        Ok(ctx) => ctx,
        Err(err) => {
            warn!(%method, %uri, error = %err, request_id, "failed to route S3 request");
            return error_to_response(&err, request_id);
        }
    };

    debug!(
        operation = %ctx.operation,
        bucket = ?ctx.bucket,
        key = ?ctx.key,
        request_id,
        "routed S3 request"
    );

    let (parts, body) = req.into_parts();
    match dispatch_operation(handler, parts, body, ctx).await {
        Ok(response) => response,
        Err(err) => {
            debug!(error = %err, request_id, "S3 operation returned error");
            error_to_response(&err, request_id)
        }
    }
}

/// Check if the request is a health probe.
fn is_health_check(method: &http::Method, path: &str) -> bool {
    *method == http::Method::GET && (path == "/_health" || path == "/_boxdrive/health")
}

/// Produce a health probe response.
fn health_check_response() -> http::Response<S3ResponseBody> {
    http::Response::builder()
        .status(http::StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(S3ResponseBody::from_string(
            r#"{"status":"running","service":"boxdrive"}"#,
        ))
        .expect("static health response should be valid")
}

/// Add the common response headers every S3 response carries.
fn add_common_headers(
    mut response: http::Response<S3ResponseBody>,
    request_id: &str,
) -> http::Response<S3ResponseBody> {
    let headers = response.headers_mut();
    if let Ok(hv) = http::header::HeaderValue::from_str(request_id) {
        headers.insert("x-amz-request-id", hv);
    }
    headers.insert(
        "Server",
        http::header::HeaderValue::from_static("BoxDrive"),
    );
    response
}
