//! Comment domain entities.

pub mod model;

pub use model::{Comment, DELETED_USERS_ACTOR};
