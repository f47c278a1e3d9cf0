//! Custom Axum extractors.

pub mod body;
pub mod pagination;
pub mod user;

pub use body::Params;
pub use pagination::PaginationParams;
pub use user::CurrentUser;
