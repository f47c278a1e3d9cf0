//! Share management: create, validate, look up and delete shares.

pub mod access;
pub mod expiration;
pub mod manager;
pub mod password;
pub mod token;

pub use access::ShareAccess;
pub use manager::{ShareManager, ShareRequest};
pub use password::LinkPasswordHasher;
pub use token::TokenGenerator;
