//! Core type definitions used across the Cumulus workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
