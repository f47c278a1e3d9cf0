//! # cumulus-database
//!
//! SQLite connection management, migrations and concrete repository
//! implementations for all Cumulus entities.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
