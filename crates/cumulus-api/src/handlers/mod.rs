//! HTTP request handlers organized by domain.

pub mod dav;
pub mod health;
pub mod shares;
