//! Core store implementations and coordination primitives for BoxDrive.
//!
//! This crate contains the pieces the HTTP layer dispatches into:
//!
//! - [`keysmith::Keysmith`] — the per-key async locking registry with a
//!   global lock-all mode.
//! - [`list`] — the pure list-protocol engine shared by both listing APIs.
//! - [`store::ObjectStore`] — the abstract store contract.
//! - [`stores::MemoryStore`] — the in-process reference store.
//! - [`stores::GitlabStore`] — the store backed by a branch of a GitLab
//!   repository.

pub mod error;
pub mod keysmith;
pub mod list;
pub mod store;
pub mod stores;
pub mod validation;

pub use error::StoreError;
pub use keysmith::Keysmith;
pub use store::ObjectStore;
pub use stores::gitlab::{GitlabConfig, GitlabStore};
pub use stores::memory::MemoryStore;
