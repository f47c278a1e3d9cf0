//! Hook dispatcher: fires hooks and isolates handler failures.
//!
//! Handlers are called in priority order. A failing or slow handler is
//! logged and skipped; the remaining handlers still run and the share
//! operation itself is never aborted.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use super::definitions::HookPayload;
use super::registry::HookRegistry;

const HANDLER_TIMEOUT: Duration = Duration::from_secs(30);

/// Dispatches hooks to all registered handlers.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Fires a hook. Returns the number of handlers that succeeded.
    pub async fn dispatch(&self, payload: &HookPayload) -> usize {
        let handlers = self.registry.handlers_for(payload.hook).await;
        if handlers.is_empty() {
            return 0;
        }

        debug!(hook = %payload.hook, handler_count = handlers.len(), "Dispatching hook");

        let mut succeeded = 0;
        for handler in &handlers {
            match tokio::time::timeout(HANDLER_TIMEOUT, handler.handle(payload)).await {
                Ok(Ok(())) => succeeded += 1,
                Ok(Err(e)) => {
                    warn!(
                        hook = %payload.hook,
                        handler = %handler.name(),
                        error = %e,
                        "Hook handler failed"
                    );
                }
                Err(_) => {
                    error!(
                        hook = %payload.hook,
                        handler = %handler.name(),
                        "Hook handler timed out after 30 seconds"
                    );
                }
            }
        }
        succeeded
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}
