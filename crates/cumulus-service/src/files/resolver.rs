//! Maps paths in a user's file tree to file cache nodes.
//!
//! A user's tree is their home storage plus every share they received,
//! mounted at the share's `file_target`.

use std::sync::Arc;

use tracing::debug;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_database::repositories::{NodeRepository, ShareRepository};
use cumulus_entity::mount::CachedMountInfo;
use cumulus_entity::node::Node;
use cumulus_entity::share::{Permissions, Share};

use crate::mount::UserMountCache;

/// A node as seen by a particular user.
#[derive(Debug, Clone)]
pub struct ResolvedNode {
    /// The file cache row.
    pub node: Node,
    /// Permissions the user has on the node.
    pub permissions: Permissions,
    /// The received share the node was reached through.
    pub via_share: Option<Share>,
}

impl ResolvedNode {
    /// Whether the user may re-share the node.
    pub fn is_shareable(&self) -> bool {
        self.permissions.contains(Permissions::SHARE)
    }
}

/// Strip leading and trailing slashes and reject parent references.
pub fn normalize_path(path: &str) -> AppResult<String> {
    let mut parts = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => return Err(AppError::validation("Path must not contain '..'")),
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

/// Resolves user paths against home storages and received shares.
#[derive(Debug, Clone)]
pub struct NodeResolver {
    nodes: Arc<NodeRepository>,
    shares: Arc<ShareRepository>,
    mounts: Arc<UserMountCache>,
}

impl NodeResolver {
    /// Creates a new resolver.
    pub fn new(
        nodes: Arc<NodeRepository>,
        shares: Arc<ShareRepository>,
        mounts: Arc<UserMountCache>,
    ) -> Self {
        Self {
            nodes,
            shares,
            mounts,
        }
    }

    /// The root of a user's home, registering its mount on first use.
    pub async fn user_folder(&self, uid: &str) -> AppResult<Node> {
        let root = self.nodes.ensure_home(uid).await?;
        self.mounts
            .register_mount(CachedMountInfo {
                user_id: uid.to_string(),
                storage_id: root.storage,
                root_id: root.file_id,
                mount_point: CachedMountInfo::home_mount_point(uid),
            })
            .await?;
        Ok(root)
    }

    /// Resolve a path in the user's tree. Returns `None` when nothing
    /// exists there.
    pub async fn get(&self, uid: &str, path: &str) -> AppResult<Option<ResolvedNode>> {
        let path = normalize_path(path)?;
        let root = self.user_folder(uid).await?;

        if let Some(node) = self.nodes.find_by_path(root.storage, &path).await? {
            return Ok(Some(ResolvedNode {
                permissions: node.permissions,
                node,
                via_share: None,
            }));
        }

        for share in self.shares.find_received(uid).await? {
            let target = share.file_target.trim_matches('/');
            let rest = if path == target {
                ""
            } else if let Some(rest) = path.strip_prefix(target).and_then(|r| r.strip_prefix('/')) {
                rest
            } else {
                continue;
            };

            let Some(shared_root) = self.nodes.find_by_id(share.file_source).await? else {
                continue;
            };
            self.mounts
                .register_mount(CachedMountInfo {
                    user_id: uid.to_string(),
                    storage_id: shared_root.storage,
                    root_id: shared_root.file_id,
                    mount_point: format!("/{uid}/files/{target}/"),
                })
                .await?;

            let node = if rest.is_empty() {
                Some(shared_root)
            } else {
                let inner = if shared_root.path.is_empty() {
                    rest.to_string()
                } else {
                    format!("{}/{}", shared_root.path, rest)
                };
                self.nodes.find_by_path(shared_root.storage, &inner).await?
            };

            if let Some(node) = node {
                debug!(uid = %uid, path = %path, share_id = share.id, "Resolved through share");
                return Ok(Some(ResolvedNode {
                    permissions: node.permissions & share.permissions,
                    node,
                    via_share: Some(share),
                }));
            }
        }

        Ok(None)
    }

    /// Direct children of a folder, seen with the same rights as the folder.
    pub async fn children(&self, parent: &ResolvedNode) -> AppResult<Vec<ResolvedNode>> {
        if !parent.node.is_folder {
            return Ok(Vec::new());
        }
        let share_permissions = parent.via_share.as_ref().map(|s| s.permissions);
        let children = self.nodes.children(parent.node.file_id).await?;
        Ok(children
            .into_iter()
            .map(|node| ResolvedNode {
                permissions: share_permissions.map_or(node.permissions, |p| node.permissions & p),
                node,
                via_share: parent.via_share.clone(),
            })
            .collect())
    }

    /// Look up a node by file id.
    pub async fn get_by_id(&self, file_id: i64) -> AppResult<Option<Node>> {
        self.nodes.find_by_id(file_id).await
    }

    /// Create a file or folder in the user's home, creating missing parent
    /// folders on the way.
    pub async fn create(
        &self,
        uid: &str,
        path: &str,
        is_folder: bool,
        permissions: Permissions,
    ) -> AppResult<Node> {
        let path = normalize_path(path)?;
        if path.is_empty() {
            return Err(AppError::validation("Path should be set"));
        }
        let root = self.user_folder(uid).await?;

        let parts: Vec<&str> = path.split('/').collect();
        let mut parent = root;
        for (i, name) in parts.iter().enumerate() {
            let current = parts[..=i].join("/");
            let last = i + 1 == parts.len();
            parent = match self.nodes.find_by_path(parent.storage, &current).await? {
                Some(existing) if !last => {
                    if !existing.is_folder {
                        return Err(AppError::validation(format!("'{current}' is not a folder")));
                    }
                    existing
                }
                Some(_) => return Err(AppError::conflict(format!("'{current}' already exists"))),
                None if last => {
                    self.nodes
                        .insert(parent.storage, uid, parent.file_id, &current, name, is_folder, permissions)
                        .await?
                }
                None => {
                    self.nodes
                        .insert(parent.storage, uid, parent.file_id, &current, name, true, Permissions::ALL)
                        .await?
                }
            };
        }
        Ok(parent)
    }
}
