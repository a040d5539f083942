//! Operation dispatch: the boundary between HTTP plumbing and business
//! logic.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use boxdrive_model::S3Operation;
use boxdrive_model::error::S3Error;

use crate::body::S3ResponseBody;
use crate::router::RoutingContext;

/// Trait the business-logic provider implements.
///
/// Uses a boxed future so the service layer can hold `Arc<dyn S3Handler>`
/// style trait objects.
pub trait S3Handler: Send + Sync + 'static {
    /// Handle an identified S3 operation and produce an HTTP response.
    fn handle_operation(
        &self,
        op: S3Operation,
        parts: http::request::Parts,
        body: Bytes,
        ctx: RoutingContext,
    ) -> Pin<Box<dyn Future<Output = Result<http::Response<S3ResponseBody>, S3Error>> + Send + '_>>;
}

/// Dispatch a routed S3 request to the handler.
pub async fn dispatch_operation<H: S3Handler>(
    handler: &H,
    parts: http::request::Parts,
    body: Bytes,
    ctx: RoutingContext,
) -> Result<http::Response<S3ResponseBody>, S3Error> {
    let op = ctx.operation;
    tracing::debug!(operation = %op, bucket = ?ctx.bucket, key = ?ctx.key, "dispatching S3 operation");
    handler.handle_operation(op, parts, body, ctx).await
}
