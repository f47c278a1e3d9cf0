//! Request and response shapes of the HTTP API.

pub mod share;

pub use share::{CreateShareParams, Scalar, ShareData};
