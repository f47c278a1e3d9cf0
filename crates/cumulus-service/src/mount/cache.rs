//! Cache of the storages mounted into each user's file tree.

use std::sync::Arc;

use moka::future::Cache;
use tracing::{debug, info};

use cumulus_core::result::AppResult;
use cumulus_database::repositories::MountRepository;
use cumulus_entity::mount::CachedMountInfo;

/// Remembers which storages are mounted for which user.
///
/// Lookups by user go through an in-memory cache that is invalidated
/// whenever a mount is registered for that user. Lookups by storage or
/// root always hit the database.
#[derive(Debug, Clone)]
pub struct UserMountCache {
    repo: Arc<MountRepository>,
    by_user: Cache<String, Arc<Vec<CachedMountInfo>>>,
}

impl UserMountCache {
    /// Creates a mount cache holding at most `capacity` users.
    pub fn new(repo: Arc<MountRepository>, capacity: u64) -> Self {
        Self {
            repo,
            by_user: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Records a mount unless the user already has one with the same root.
    ///
    /// Returns `true` when a new row was written.
    pub async fn register_mount(&self, mount: CachedMountInfo) -> AppResult<bool> {
        let cached = self.get_mounts_for_user(&mount.user_id).await?;
        if cached.iter().any(|m| m.root_id == mount.root_id) {
            return Ok(false);
        }

        let inserted = self.repo.insert(&mount).await?;
        self.by_user.invalidate(&mount.user_id).await;

        if inserted {
            info!(
                user_id = %mount.user_id,
                storage_id = mount.storage_id,
                root_id = mount.root_id,
                mount_point = %mount.mount_point,
                "Registered mount"
            );
        }
        Ok(inserted)
    }

    /// All mounts of a user, served from the cache when possible.
    pub async fn get_mounts_for_user(&self, user_id: &str) -> AppResult<Arc<Vec<CachedMountInfo>>> {
        if let Some(mounts) = self.by_user.get(user_id).await {
            return Ok(mounts);
        }
        debug!(user_id = %user_id, "Loading mounts from database");
        let mounts = Arc::new(self.repo.find_by_user(user_id).await?);
        self.by_user
            .insert(user_id.to_string(), mounts.clone())
            .await;
        Ok(mounts)
    }

    /// All mounts of a storage.
    pub async fn get_mounts_for_storage_id(&self, storage_id: i64) -> AppResult<Vec<CachedMountInfo>> {
        self.repo.find_by_storage(storage_id).await
    }

    /// All mounts rooted at a file id.
    pub async fn get_mounts_for_root_id(&self, root_id: i64) -> AppResult<Vec<CachedMountInfo>> {
        self.repo.find_by_root(root_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_database::DatabasePool;

    fn mount(user: &str, storage: i64, root: i64, point: &str) -> CachedMountInfo {
        CachedMountInfo {
            user_id: user.into(),
            storage_id: storage,
            root_id: root,
            mount_point: point.into(),
        }
    }

    #[tokio::test]
    async fn test_register_invalidates_user_entry() {
        let db = DatabasePool::in_memory().await.expect("database");
        let cache = UserMountCache::new(Arc::new(MountRepository::new(db.pool().clone())), 100);

        assert!(cache.get_mounts_for_user("alice").await.expect("empty").is_empty());

        assert!(cache.register_mount(mount("alice", 1, 10, "/alice/")).await.expect("add"));
        let mounts = cache.get_mounts_for_user("alice").await.expect("mounts");
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].mount_point, "/alice/");

        // Same root again is ignored.
        assert!(!cache.register_mount(mount("alice", 1, 10, "/alice/x/")).await.expect("dup"));

        cache.register_mount(mount("bob", 1, 11, "/bob/files/shared/")).await.expect("bob");
        assert_eq!(cache.get_mounts_for_storage_id(1).await.expect("storage").len(), 2);
        let by_root = cache.get_mounts_for_root_id(11).await.expect("root");
        assert_eq!(by_root, vec![mount("bob", 1, 11, "/bob/files/shared/")]);
    }
}
