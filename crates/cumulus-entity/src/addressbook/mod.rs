//! CardDAV entities.

pub mod model;

pub use model::{AddressBook, Card};
