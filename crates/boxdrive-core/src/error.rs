//! Store-level error taxonomy.

/// Errors produced by [`ObjectStore`](crate::store::ObjectStore)
/// implementations.
///
/// The HTTP layer maps these onto wire-side S3 errors; the taxonomy here is
/// deliberately small: existence failures, a create collision, validation
/// failures, and remote failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The target bucket does not exist.
    #[error("the specified bucket does not exist: {bucket}")]
    NoSuchBucket {
        /// The bucket name that was not found.
        bucket: String,
    },

    /// The target object does not exist (or is the placeholder).
    #[error("the specified key does not exist: {key}")]
    NoSuchKey {
        /// The key that was not found.
        key: String,
    },

    /// Bucket creation collided with an existing bucket.
    #[error("the requested bucket name is not available: {bucket}")]
    BucketAlreadyExists {
        /// The bucket name that already exists.
        bucket: String,
    },

    /// The bucket name failed validation.
    #[error("invalid bucket name {name:?}: {reason}")]
    InvalidBucketName {
        /// The invalid bucket name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The object key failed validation.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey {
        /// The invalid key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The remote backend returned an unexpected status.
    #[error("remote returned unexpected status {status}: {message}")]
    Remote {
        /// HTTP status from the remote.
        status: u16,
        /// Remote response body or description.
        message: String,
    },

    /// Transport-level failure talking to the remote backend.
    #[error("remote transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Convenience result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
