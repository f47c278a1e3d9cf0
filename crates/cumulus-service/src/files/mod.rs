//! Resolution of user-visible paths to file cache nodes.

pub mod resolver;

pub use resolver::{NodeResolver, ResolvedNode, normalize_path};
