//! S3 RestXml serialization for BoxDrive.
//!
//! Response bodies follow the AWS S3 RestXml conventions: the
//! `http://s3.amazonaws.com/doc/2006-03-01/` namespace on the root element,
//! lowercase booleans, ISO 8601 timestamps, and a leading XML declaration.

pub mod error;
pub mod serialize;

pub use error::{XmlError, error_to_xml};
pub use serialize::{S3Serialize, to_xml};
