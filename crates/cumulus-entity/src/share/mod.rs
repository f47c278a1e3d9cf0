//! Share domain entities.

pub mod model;
pub mod permission;
pub mod share_type;

pub use model::{NewShare, Share};
pub use permission::Permissions;
pub use share_type::{ShareType, UnknownShareType};
