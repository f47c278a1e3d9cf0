//! Domain events emitted by Cumulus operations.
//!
//! Events are handed to the hook registry, which fans them out to
//! registered handlers.

pub mod share;

pub use share::{ShareEvent, ShareHookParams};
