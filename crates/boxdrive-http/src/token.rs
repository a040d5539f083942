//! Opaque continuation tokens for `ListObjectsV2`.
//!
//! The token is the base64 of the v1-style cursor key. Clients treat it as
//! opaque; base64 keeps key bytes out of the query-string grammar.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use boxdrive_model::error::{S3Error, S3ErrorCode};

/// Encode a cursor key as a continuation token.
#[must_use]
pub fn encode_continuation_token(key: &str) -> String {
    BASE64.encode(key.as_bytes())
}

/// Decode a continuation token back to a cursor key.
///
/// # Errors
///
/// Returns `InvalidArgument` when the token is not base64 or not UTF-8.
pub fn decode_continuation_token(token: &str) -> Result<String, S3Error> {
    let bytes = BASE64.decode(token).map_err(|_| {
        S3Error::with_message(S3ErrorCode::InvalidArgument, "Invalid continuation token")
    })?;
    String::from_utf8(bytes).map_err(|_| {
        S3Error::with_message(
            S3ErrorCode::InvalidArgument,
            "Continuation token contains invalid UTF-8",
        )
    })
}
