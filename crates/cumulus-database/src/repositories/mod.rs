//! Repository implementations for all Cumulus entities.

pub mod addressbook;
pub mod comment;
pub mod group;
pub mod mount;
pub mod node;
pub mod property;
pub mod share;
pub mod tag;
pub mod user;

pub use addressbook::CardDavRepository;
pub use comment::CommentRepository;
pub use group::GroupRepository;
pub use mount::MountRepository;
pub use node::NodeRepository;
pub use property::PropertyRepository;
pub use share::ShareRepository;
pub use tag::SystemTagRepository;
pub use user::UserRepository;
