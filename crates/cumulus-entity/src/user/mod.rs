//! User and group entities.

pub mod group;
pub mod model;

pub use group::Group;
pub use model::{CreateUser, User};
