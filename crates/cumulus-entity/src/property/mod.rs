//! WebDAV dead property entities.

pub mod model;

pub use model::{Property, PropertyChange};
