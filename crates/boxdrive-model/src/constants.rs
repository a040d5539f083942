//! Protocol constants for the BoxDrive S3-compatible API.

/// The S3 XML namespace used on every response document.
pub const S3_XML_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Content type assumed when a request does not supply one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Storage class reported for every object.
pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

/// Fixed owner ID reported in listings.
pub const OWNER_ID: &str = "boxdrive";

/// Fixed owner display name reported in listings.
pub const OWNER_DISPLAY_NAME: &str = "BoxDrive";

/// Default `max-keys` when a listing request does not supply one.
pub const DEFAULT_MAX_KEYS: i32 = 1000;
