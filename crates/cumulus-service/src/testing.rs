//! Shared fixture for service tests: an in-memory database seeded with a
//! few users, a group and a small file tree in alice's home.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use cumulus_core::config::SharingConfig;
use cumulus_core::events::ShareEvent;
use cumulus_core::result::AppResult;
use cumulus_database::DatabasePool;
use cumulus_database::repositories::{
    GroupRepository, MountRepository, NodeRepository, ShareRepository, UserRepository,
};
use cumulus_entity::share::Permissions;
use cumulus_entity::user::CreateUser;

use crate::files::NodeResolver;
use crate::hooks::{HookDispatcher, HookHandler, HookPayload, HookPoint, HookRegistry};
use crate::mount::UserMountCache;
use crate::share::ShareManager;

pub(crate) struct Fixture {
    pub db: DatabasePool,
    pub mounts: Arc<UserMountCache>,
    pub resolver: NodeResolver,
    pub registry: Arc<HookRegistry>,
    pub shares: ShareManager,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_policy(SharingConfig::default()).await
    }

    pub async fn with_policy(policy: SharingConfig) -> Self {
        let db = DatabasePool::in_memory().await.expect("database");
        let pool = db.pool().clone();

        let users = Arc::new(UserRepository::new(pool.clone()));
        let groups = Arc::new(GroupRepository::new(pool.clone()));
        let nodes = Arc::new(NodeRepository::new(pool.clone()));
        let share_repo = Arc::new(ShareRepository::new(pool.clone()));
        let mounts = Arc::new(UserMountCache::new(
            Arc::new(MountRepository::new(pool)),
            100,
        ));

        for uid in ["alice", "bob", "carol", "dave"] {
            users
                .create(&CreateUser {
                    uid: uid.into(),
                    display_name: uid.to_uppercase(),
                    ..CreateUser::default()
                })
                .await
                .expect("user");
        }
        groups.create("staff", "Staff").await.expect("group");
        groups.add_member("staff", "bob").await.expect("member");

        let resolver = NodeResolver::new(nodes, share_repo.clone(), mounts.clone());
        for (path, is_folder, perms) in [
            ("docs", true, Permissions::ALL),
            ("docs/report.txt", false, Permissions(27)),
            ("readonly.txt", false, Permissions(17)),
            ("private.txt", false, Permissions(15)),
        ] {
            resolver
                .create("alice", path, is_folder, perms)
                .await
                .expect("node");
        }

        let registry = Arc::new(HookRegistry::new());
        let shares = ShareManager::new(
            share_repo,
            users,
            groups,
            HookDispatcher::new(registry.clone()),
            policy,
        );

        Self {
            db,
            mounts,
            resolver,
            registry,
            shares,
        }
    }
}

/// Remembers every share event it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingHandler {
    events: Mutex<Vec<ShareEvent>>,
}

impl RecordingHandler {
    pub async fn install(registry: &HookRegistry) -> Arc<Self> {
        let handler = Arc::new(Self::default());
        registry
            .register_all(
                &[HookPoint::PostShare, HookPoint::PreUnshare, HookPoint::PostUnshare],
                handler.clone(),
            )
            .await;
        handler
    }

    pub async fn events(&self) -> Vec<ShareEvent> {
        self.events.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.events.lock().await.clear();
    }
}

#[async_trait]
impl HookHandler for RecordingHandler {
    async fn handle(&self, payload: &HookPayload) -> AppResult<()> {
        self.events.lock().await.push(payload.event.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}
