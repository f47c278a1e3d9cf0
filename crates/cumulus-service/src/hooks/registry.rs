//! Share hook handlers, kept per hook point in priority order.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use cumulus_core::result::AppResult;

use super::definitions::{HookPayload, HookPoint};

/// Something that reacts to `pre_unshare`, `post_unshare` or `post_shared`.
#[async_trait]
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Errors are logged by the dispatcher; they never abort the share
    /// operation.
    async fn handle(&self, payload: &HookPayload) -> AppResult<()>;

    fn name(&self) -> &str;

    /// Lower runs first.
    fn priority(&self) -> i32 {
        100
    }
}

#[derive(Debug)]
struct HookEntry {
    handler: Arc<dyn HookHandler>,
    priority: i32,
}

/// Handlers keyed by hook point. Built at startup and shared through an
/// `Arc` with every [`HookDispatcher`](super::HookDispatcher).
#[derive(Debug, Default)]
pub struct HookRegistry {
    handlers: RwLock<HashMap<HookPoint, Vec<HookEntry>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `handler` under `hook`.
    pub async fn register(&self, hook: HookPoint, handler: Arc<dyn HookHandler>) {
        let name = handler.name().to_string();
        let priority = handler.priority();

        let mut handlers = self.handlers.write().await;
        let entries = handlers.entry(hook).or_default();
        entries.push(HookEntry { handler, priority });
        // Stable sort keeps registration order among equal priorities.
        entries.sort_by_key(|e| e.priority);

        info!(hook = %hook, handler = %name, priority, "Share hook registered");
    }

    /// Add one handler under several hook points.
    pub async fn register_all(&self, hooks: &[HookPoint], handler: Arc<dyn HookHandler>) {
        for hook in hooks {
            self.register(*hook, handler.clone()).await;
        }
    }

    /// Drop every registration made under `name`.
    pub async fn unregister(&self, name: &str) {
        let mut handlers = self.handlers.write().await;
        for entries in handlers.values_mut() {
            entries.retain(|e| e.handler.name() != name);
        }
        handlers.retain(|_, entries| !entries.is_empty());
        info!(handler = %name, "Share hook removed");
    }

    /// Handlers for `hook`, in the order they must run.
    pub async fn handlers_for(&self, hook: HookPoint) -> Vec<Arc<dyn HookHandler>> {
        let handlers = self.handlers.read().await;
        handlers
            .get(&hook)
            .map(|entries| entries.iter().map(|e| e.handler.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn handler_count(&self, hook: HookPoint) -> usize {
        let handlers = self.handlers.read().await;
        handlers.get(&hook).map(Vec::len).unwrap_or(0)
    }
}
