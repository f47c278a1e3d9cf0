//! System tag entities.

pub mod model;

pub use model::{SystemTag, TagObject};
