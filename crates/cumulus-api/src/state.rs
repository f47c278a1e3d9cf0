//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::SqlitePool;

use cumulus_core::config::AppConfig;
use cumulus_database::repositories::{
    GroupRepository, MountRepository, NodeRepository, PropertyRepository, ShareRepository,
    UserRepository,
};
use cumulus_service::hooks::AuditLogHandler;
use cumulus_service::{
    HookDispatcher, HookRegistry, NodeResolver, ShareAccess, ShareManager, UserMountCache,
};
use cumulus_webdav::DavHandler;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db_pool: SqlitePool,
    /// Share hook registry
    pub hook_registry: Arc<HookRegistry>,

    // ── Repositories ─────────────────────────────────────────
    /// User repository
    pub user_repo: Arc<UserRepository>,
    /// Group repository
    pub group_repo: Arc<GroupRepository>,

    // ── Services ─────────────────────────────────────────────
    /// Per-user mount cache
    pub mount_cache: Arc<UserMountCache>,
    /// Path resolution in user file trees
    pub resolver: Arc<NodeResolver>,
    /// Share manager
    pub share_manager: Arc<ShareManager>,
    /// Share visibility rules
    pub share_access: Arc<ShareAccess>,
    /// WebDAV request handler
    pub dav: Arc<DavHandler>,
}

impl AppState {
    /// Wire repositories and services on top of a migrated pool.
    pub async fn build(config: AppConfig, db_pool: SqlitePool) -> Self {
        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let group_repo = Arc::new(GroupRepository::new(db_pool.clone()));
        let node_repo = Arc::new(NodeRepository::new(db_pool.clone()));
        let share_repo = Arc::new(ShareRepository::new(db_pool.clone()));
        let mount_repo = Arc::new(MountRepository::new(db_pool.clone()));
        let property_repo = Arc::new(PropertyRepository::new(db_pool.clone()));

        let hook_registry = Arc::new(HookRegistry::new());
        hook_registry
            .register_all(&AuditLogHandler::HOOKS, Arc::new(AuditLogHandler))
            .await;

        let mount_cache = Arc::new(UserMountCache::new(
            mount_repo,
            config.dav.mount_cache_capacity,
        ));
        let resolver = NodeResolver::new(node_repo, Arc::clone(&share_repo), Arc::clone(&mount_cache));
        let share_manager = Arc::new(ShareManager::new(
            share_repo,
            Arc::clone(&user_repo),
            Arc::clone(&group_repo),
            HookDispatcher::new(Arc::clone(&hook_registry)),
            config.sharing.clone(),
        ));
        let share_access = Arc::new(ShareAccess::new(Arc::clone(&group_repo)));
        let dav = Arc::new(DavHandler::new(resolver.clone(), property_repo));

        Self {
            config: Arc::new(config),
            db_pool,
            hook_registry,
            user_repo,
            group_repo,
            mount_cache,
            resolver: Arc::new(resolver),
            share_manager,
            share_access,
            dav,
        }
    }
}
