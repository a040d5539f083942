//! Data model for the BoxDrive S3-compatible API.
//!
//! This crate holds the pure data types shared by the store implementations,
//! the XML layer, and the HTTP layer: object/bucket descriptors, listing
//! inputs and outputs, the operation enum, the wire error type, and protocol
//! constants. It contains no I/O.

pub mod constants;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use error::{S3Error, S3ErrorCode};
pub use operations::S3Operation;
