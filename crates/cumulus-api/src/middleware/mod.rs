//! Tower middleware for the HTTP app.

pub mod cors;
pub mod logging;
