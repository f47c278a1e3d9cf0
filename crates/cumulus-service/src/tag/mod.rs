//! System tags and their assignment to objects.

pub mod manager;
pub mod mapper;

pub use manager::SystemTagManager;
pub use mapper::SystemTagObjectMapper;
