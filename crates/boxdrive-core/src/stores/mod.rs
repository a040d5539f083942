//! Backing store implementations.

pub mod gitlab;
pub mod memory;

pub use gitlab::{GitlabConfig, GitlabStore};
pub use memory::MemoryStore;
