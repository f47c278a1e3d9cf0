//! Per-user mount cache.

pub mod cache;

pub use cache::UserMountCache;
