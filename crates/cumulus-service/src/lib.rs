//! # cumulus-service
//!
//! Business logic service layer for Cumulus. Each manager orchestrates
//! repositories and the hook registry to implement application-level use
//! cases.
//!
//! Managers follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod addressbook;
pub mod comment;
pub mod files;
pub mod hooks;
pub mod mount;
pub mod share;
pub mod tag;

#[cfg(test)]
pub(crate) mod testing;

pub use account::AccountService;
pub use addressbook::AddressBookSync;
pub use comment::CommentsManager;
pub use files::{NodeResolver, ResolvedNode};
pub use hooks::{HookDispatcher, HookRegistry};
pub use mount::UserMountCache;
pub use share::{ShareAccess, ShareManager};
pub use tag::{SystemTagManager, SystemTagObjectMapper};
