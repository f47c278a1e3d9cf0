//! Mount entities.

pub mod model;

pub use model::CachedMountInfo;
