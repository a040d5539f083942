//! HTTP request to typed input extraction.

use boxdrive_model::constants::DEFAULT_MAX_KEYS;
use boxdrive_model::error::{S3Error, S3ErrorCode};
use boxdrive_model::input::{ListObjectsInput, ListObjectsV2Input};
use boxdrive_model::types::EncodingType;

use crate::router::{RoutingContext, query_value};

/// Extract a header value as a string.
pub fn header_str(parts: &http::request::Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

/// Parse the `max-keys` query parameter; rejects non-integers and negatives.
fn parse_max_keys(params: &[(String, String)]) -> Result<Option<i32>, S3Error> {
    let Some(raw) = query_value(params, "max-keys") else {
        return Ok(None);
    };
    let value: i32 = raw.parse().map_err(|_| {
        S3Error::with_message(
            S3ErrorCode::InvalidArgument,
            "Argument max-keys must be an integer between 0 and 2147483647",
        )
    })?;
    if value < 0 {
        return Err(S3Error::with_message(
            S3ErrorCode::InvalidArgument,
            "Argument max-keys must not be negative",
        ));
    }
    Ok(Some(value))
}

/// Parse the `encoding-type` query parameter; only `url` is defined.
fn parse_encoding_type(params: &[(String, String)]) -> Result<Option<EncodingType>, S3Error> {
    match query_value(params, "encoding-type") {
        None | Some("") => Ok(None),
        Some("url") => Ok(Some(EncodingType::Url)),
        Some(other) => Err(S3Error::with_message(
            S3ErrorCode::InvalidArgument,
            format!("Invalid Encoding Method specified in Request: {other}"),
        )),
    }
}

fn query_owned(params: &[(String, String)], key: &str) -> Option<String> {
    query_value(params, key)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

/// Build a v1 listing input from the routing context.
pub fn list_objects_input(bucket: String, ctx: &RoutingContext) -> Result<ListObjectsInput, S3Error> {
    Ok(ListObjectsInput {
        bucket,
        prefix: query_owned(&ctx.query_params, "prefix"),
        delimiter: query_owned(&ctx.query_params, "delimiter"),
        marker: query_owned(&ctx.query_params, "marker"),
        max_keys: parse_max_keys(&ctx.query_params)?,
        encoding_type: parse_encoding_type(&ctx.query_params)?,
    })
}

/// Build a v2 listing input from the routing context.
pub fn list_objects_v2_input(
    bucket: String,
    ctx: &RoutingContext,
) -> Result<ListObjectsV2Input, S3Error> {
    Ok(ListObjectsV2Input {
        bucket,
        prefix: query_owned(&ctx.query_params, "prefix"),
        delimiter: query_owned(&ctx.query_params, "delimiter"),
        continuation_token: query_owned(&ctx.query_params, "continuation-token"),
        start_after: query_owned(&ctx.query_params, "start-after"),
        max_keys: parse_max_keys(&ctx.query_params)?,
        encoding_type: parse_encoding_type(&ctx.query_params)?,
    })
}

/// Resolve the effective `max-keys` for a listing.
pub fn effective_max_keys(max_keys: Option<i32>) -> (i32, usize) {
    let wire = max_keys.unwrap_or(DEFAULT_MAX_KEYS);
    let effective = usize::try_from(wire).unwrap_or(0);
    (wire, effective)
}

/// Parse a `Range` header against a body of `total` bytes.
///
/// Returns `Ok(None)` when the header is absent or carries no byte range
/// (the response is then the full body). A malformed or unsatisfiable range
/// is `InvalidRange` (416). Missing bounds default to the body edges; an
/// end past the body is clamped.
pub fn parse_range(header: Option<&str>, total: usize) -> Result<Option<(usize, usize)>, S3Error> {
    let Some(header) = header else {
        return Ok(None);
    };
    let range = header.trim().trim_start_matches("bytes=");
    let Some((start_str, end_str)) = range.split_once('-') else {
        return Ok(None);
    };

    let start: usize = if start_str.is_empty() {
        0
    } else {
        start_str
            .parse()
            .map_err(|_| S3Error::invalid_range(header))?
    };
    let end: usize = if end_str.is_empty() {
        total.saturating_sub(1)
    } else {
        end_str
            .parse()
            .map_err(|_| S3Error::invalid_range(header))?
    };
    let end = end.min(total.saturating_sub(1));

    if start > end || start >= total {
        return Err(S3Error::invalid_range(header));
    }
    Ok(Some((start, end)))
}
