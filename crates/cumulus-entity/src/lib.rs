//! # cumulus-entity
//!
//! Domain entity models for Cumulus. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod addressbook;
pub mod comment;
pub mod mount;
pub mod node;
pub mod property;
pub mod share;
pub mod tag;
pub mod user;
