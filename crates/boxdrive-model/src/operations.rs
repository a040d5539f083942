//! The set of S3 operations this service speaks.

/// An identified S3 operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum S3Operation {
    /// `GET /` — list all buckets.
    ListBuckets,
    /// `PUT /{bucket}` — create a bucket.
    CreateBucket,
    /// `DELETE /{bucket}` — delete a bucket.
    DeleteBucket,
    /// `GET /{bucket}` — list objects (v1).
    ListObjects,
    /// `GET /{bucket}?list-type=2` — list objects (v2).
    ListObjectsV2,
    /// `GET /{bucket}/{key}` — get an object.
    GetObject,
    /// `HEAD /{bucket}/{key}` — get object metadata.
    HeadObject,
    /// `PUT /{bucket}/{key}` — put an object.
    PutObject,
    /// `DELETE /{bucket}/{key}` — delete an object.
    DeleteObject,
}

impl S3Operation {
    /// Returns the operation name as used in AWS documentation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListBuckets => "ListBuckets",
            Self::CreateBucket => "CreateBucket",
            Self::DeleteBucket => "DeleteBucket",
            Self::ListObjects => "ListObjects",
            Self::ListObjectsV2 => "ListObjectsV2",
            Self::GetObject => "GetObject",
            Self::HeadObject => "HeadObject",
            Self::PutObject => "PutObject",
            Self::DeleteObject => "DeleteObject",
        }
    }
}

impl std::fmt::Display for S3Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
