//! # cumulus-api
//!
//! HTTP API layer for Cumulus built on Axum.
//!
//! Serves the OCS files_sharing endpoints and the WebDAV files tree,
//! together with middleware (CORS, request logging, tracing), extractors,
//! DTOs and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod ocs;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
