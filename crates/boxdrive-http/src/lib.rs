//! HTTP layer for BoxDrive.
//!
//! Pieces, in request order:
//!
//! 1. [`service::S3HttpService`] — hyper `Service`: request IDs, health
//!    probe, body collection, common headers.
//! 2. [`router`] — maps method + path + query to an
//!    [`S3Operation`](boxdrive_model::S3Operation).
//! 3. [`dispatch::S3Handler`] — the boundary trait between HTTP plumbing and
//!    business logic.
//! 4. [`handlers::S3Facade`] — the handler implementation translating store
//!    results into protocol responses.

pub mod body;
pub mod dispatch;
pub mod handlers;
pub mod request;
pub mod response;
pub mod router;
pub mod service;
pub mod token;

pub use body::S3ResponseBody;
pub use dispatch::S3Handler;
pub use handlers::S3Facade;
pub use service::S3HttpService;
