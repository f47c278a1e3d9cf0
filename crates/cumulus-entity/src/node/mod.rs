//! File cache entities.

pub mod model;

pub use model::{Node, Storage};
