//! Users and groups as seen by administrators.

pub mod service;

pub use service::AccountService;
