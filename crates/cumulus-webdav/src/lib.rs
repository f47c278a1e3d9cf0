//! WebDAV property storage for Cumulus.
//!
//! Serves `PROPFIND` and `PROPPATCH` on the files of a user, keeping dead
//! properties in the `properties` table, and keeps that table in step
//! when resources are deleted or moved.

pub mod backend;
pub mod handler;
pub mod properties;
pub mod request;

pub use backend::CustomPropertiesBackend;
pub use handler::DavHandler;
