//! Bucket-name and key validation.

use std::net::Ipv4Addr;

use crate::error::{StoreError, StoreResult};

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;
/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Validate an S3 bucket name.
///
/// Rules: 3–63 characters; lowercase letters, digits, hyphens, and dots;
/// must start and end with a letter or digit; no consecutive dots; must not
/// be formatted as an IPv4 address.
pub fn validate_bucket_name(name: &str) -> StoreResult<()> {
    let len = name.len();

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(StoreError::InvalidBucketName {
            name: name.to_owned(),
            reason: format!(
                "bucket name must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
            ),
        });
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(StoreError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must only contain lowercase letters, numbers, hyphens, and dots"
                .to_owned(),
        });
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[len - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return Err(StoreError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must start and end with a letter or number".to_owned(),
        });
    }

    if name.contains("..") {
        return Err(StoreError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must not contain consecutive dots".to_owned(),
        });
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(StoreError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must not be formatted as an IP address".to_owned(),
        });
    }

    Ok(())
}

/// Validate an object key.
///
/// Keys are opaque beyond a few hard rules: non-empty, no leading slash, no
/// NUL, no ASCII control characters.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey {
            key: key.to_owned(),
            reason: "key must not be empty".to_owned(),
        });
    }

    if key.starts_with('/') {
        return Err(StoreError::InvalidKey {
            key: key.to_owned(),
            reason: "key must not start with a slash".to_owned(),
        });
    }

    if key.bytes().any(|b| b.is_ascii_control()) {
        return Err(StoreError::InvalidKey {
            key: key.to_owned(),
            reason: "key must not contain control characters".to_owned(),
        });
    }

    Ok(())
}
