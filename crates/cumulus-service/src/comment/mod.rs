//! Threaded comments on arbitrary objects.

pub mod manager;

pub use manager::{CommentTree, CommentsManager};
