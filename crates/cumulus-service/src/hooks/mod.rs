//! Share hooks: handlers registered by hook point and fired around share
//! creation and deletion.

pub mod builtin;
pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use builtin::AuditLogHandler;
pub use definitions::{HookPayload, HookPoint};
pub use dispatcher::HookDispatcher;
pub use registry::{HookHandler, HookRegistry};
