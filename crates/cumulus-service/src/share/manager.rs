//! Share manager: validation of new shares, lookups, and the recursive
//! deletion cascade with its pre/post hooks.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use cumulus_core::config::SharingConfig;
use cumulus_core::error::AppError;
use cumulus_core::events::{ShareEvent, ShareHookParams};
use cumulus_core::result::AppResult;
use cumulus_core::types::pagination::{PageRequest, PageResponse};
use cumulus_database::repositories::{GroupRepository, ShareRepository, UserRepository};
use cumulus_entity::share::{NewShare, Permissions, Share, ShareType};

use super::expiration::validate_expiration;
use super::password::LinkPasswordHasher;
use super::token::TokenGenerator;
use crate::files::ResolvedNode;
use crate::hooks::{HookDispatcher, HookPayload};

/// A share as requested by a caller, before validation.
#[derive(Debug, Clone, Default)]
pub struct ShareRequest {
    /// Raw share type code.
    pub share_type: i32,
    /// Recipient uid, gid or remote address.
    pub shared_with: Option<String>,
    /// The user creating the share.
    pub shared_by: Option<String>,
    /// The node being shared, as the sharer sees it.
    pub node: Option<ResolvedNode>,
    /// Requested permissions.
    pub permissions: Permissions,
    /// Requested expiration (link shares).
    pub expiration: Option<DateTime<Utc>>,
    /// Plaintext password (link shares).
    pub password: Option<String>,
}

/// Orchestrates share creation, lookup and deletion.
#[derive(Debug, Clone)]
pub struct ShareManager {
    shares: Arc<ShareRepository>,
    users: Arc<UserRepository>,
    groups: Arc<GroupRepository>,
    hooks: HookDispatcher,
    hasher: LinkPasswordHasher,
    tokens: TokenGenerator,
    policy: SharingConfig,
}

impl ShareManager {
    /// Creates a new share manager.
    pub fn new(
        shares: Arc<ShareRepository>,
        users: Arc<UserRepository>,
        groups: Arc<GroupRepository>,
        hooks: HookDispatcher,
        policy: SharingConfig,
    ) -> Self {
        Self {
            shares,
            users,
            groups,
            hooks,
            hasher: LinkPasswordHasher::new(),
            tokens: TokenGenerator::new(),
            policy,
        }
    }

    /// Whether public links may be created.
    pub fn share_api_allow_links(&self) -> bool {
        self.policy.allow_links
    }

    /// Whether link shares of folders may accept uploads.
    pub fn share_api_link_allow_public_upload(&self) -> bool {
        self.policy.allow_public_upload
    }

    /// Validate and store a new share.
    pub async fn create_share(&self, request: ShareRequest) -> AppResult<Share> {
        let share_type = ShareType::try_from(request.share_type)
            .map_err(|_| AppError::validation("unknown share type"))?;

        let mut expiration = None;
        let mut password = None;
        match share_type {
            ShareType::User => {
                let valid = match request.shared_with.as_deref() {
                    Some(uid) => self.users.exists(uid).await?,
                    None => false,
                };
                if !valid {
                    return Err(AppError::validation("SharedWith should be a user"));
                }
            }
            ShareType::Group => {
                let valid = match request.shared_with.as_deref() {
                    Some(gid) => self.groups.find_by_gid(gid).await?.is_some(),
                    None => false,
                };
                if !valid {
                    return Err(AppError::validation("SharedWith should be a group"));
                }
            }
            ShareType::Link => {
                if !self.policy.allow_links {
                    return Err(AppError::validation("Link sharing not allowed"));
                }
                expiration = validate_expiration(request.expiration, &self.policy, Utc::now())?;
                password = self.link_password(request.password.as_deref())?;
            }
            ShareType::Remote => {
                let valid = request
                    .shared_with
                    .as_deref()
                    .and_then(|with| with.rsplit_once('@'))
                    .is_some_and(|(user, host)| !user.is_empty() && !host.is_empty());
                if !valid {
                    return Err(AppError::validation("SharedWith should be a remote address"));
                }
            }
        }

        let shared_by = request
            .shared_by
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::validation("SharedBy should be set"))?;
        let resolved = request
            .node
            .ok_or_else(|| AppError::validation("Path should be set"))?;
        if !resolved.is_shareable() {
            return Err(AppError::validation("Path is not shareable"));
        }
        if request.permissions.is_empty() {
            return Err(AppError::validation("A share requires permissions"));
        }
        if !resolved.permissions.contains(request.permissions) {
            return Err(AppError::validation("Cannot increase permissions"));
        }

        let node = &resolved.node;
        let new_share = NewShare {
            share_type,
            share_with: match share_type {
                ShareType::Link => None,
                _ => request.shared_with,
            },
            uid_owner: shared_by.clone(),
            uid_fileowner: node.owner.clone(),
            parent: resolved.via_share.as_ref().map(|s| s.id),
            item_type: node.item_type().to_string(),
            file_source: node.file_id,
            file_target: format!("/{}", node.name),
            permissions: request.permissions,
            token: share_type.uses_token().then(|| self.tokens.generate()),
            expiration,
            password,
        };

        let id = self.shares.insert(&new_share, Utc::now().timestamp()).await?;
        let share = self.get_share_by_id(id).await?;

        info!(
            share_id = share.id,
            share_type = %share.share_type,
            shared_by = %shared_by,
            file_source = share.file_source,
            parent = ?share.parent,
            "Share created"
        );

        self.hooks
            .dispatch(&HookPayload::new(
                ShareEvent::Shared {
                    share: hook_params(&share),
                },
                Some(shared_by),
            ))
            .await;

        Ok(share)
    }

    fn link_password(&self, password: Option<&str>) -> AppResult<Option<String>> {
        match password.filter(|p| !p.is_empty()) {
            Some(plain) => Ok(Some(self.hasher.hash(plain)?)),
            None if self.policy.enforce_links_password => Err(AppError::validation(
                "Passwords are enforced for link shares",
            )),
            None => Ok(None),
        }
    }

    /// Fetch a share by id.
    pub async fn get_share_by_id(&self, id: i64) -> AppResult<Share> {
        self.shares
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share {id} not found")))
    }

    /// Fetch a share by its token.
    pub async fn get_share_by_token(&self, token: &str) -> AppResult<Share> {
        self.shares
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::not_found("Share not found"))
    }

    /// Direct re-shares of a share, ordered by id.
    pub async fn get_children(&self, share: &Share) -> AppResult<Vec<Share>> {
        self.shares.find_children(share.id).await
    }

    /// Shares created by a user.
    pub async fn get_shares_by(
        &self,
        uid: &str,
        share_type: Option<ShareType>,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Share>> {
        self.shares.find_by_creator(uid, share_type, page).await
    }

    /// Check a plaintext password against a link share.
    pub fn check_password(&self, share: &Share, password: &str) -> AppResult<bool> {
        match (&share.share_type, &share.password) {
            (ShareType::Link, Some(hash)) => self.hasher.verify(password, hash),
            (ShareType::Link, None) => Ok(true),
            _ => Ok(false),
        }
    }

    /// Delete a share together with every re-share below it.
    ///
    /// Fires `pre_unshare` with the share, deletes children before their
    /// parents inside one transaction, then fires `post_unshare` listing
    /// every deleted share in deletion order. Returns that list.
    pub async fn delete_share(&self, share: &Share, actor: Option<&str>) -> AppResult<Vec<Share>> {
        if share.id == 0 {
            return Err(AppError::validation("Share does not have a valid id"));
        }
        let share = self.get_share_by_id(share.id).await?;
        let root_params = hook_params(&share);

        self.hooks
            .dispatch(&HookPayload::new(
                ShareEvent::PreUnshare {
                    share: root_params.clone(),
                },
                actor.map(str::to_string),
            ))
            .await;

        let mut deleted = self.collect_descendants(&share).await?;
        deleted.push(share);
        let ids: Vec<i64> = deleted.iter().map(|s| s.id).collect();

        self.shares.delete_all(&ids).await.inspect_err(|e| {
            warn!(share_id = root_params.id, error = %e, "Share deletion failed");
        })?;

        info!(
            share_id = root_params.id,
            deleted = ids.len(),
            actor = actor.unwrap_or(""),
            "Share deleted"
        );

        self.hooks
            .dispatch(&HookPayload::new(
                ShareEvent::PostUnshare {
                    share: root_params,
                    deleted_shares: deleted.iter().map(hook_params).collect(),
                },
                actor.map(str::to_string),
            ))
            .await;

        Ok(deleted)
    }

    /// Every re-share below `root` in post-order: for each child, ordered by
    /// id, its own descendants first and then the child.
    async fn collect_descendants(&self, root: &Share) -> AppResult<Vec<Share>> {
        let mut visited = HashSet::from([root.id]);
        let mut ordered = Vec::new();
        let mut stack: Vec<(Share, bool)> = self
            .shares
            .find_children(root.id)
            .await?
            .into_iter()
            .rev()
            .map(|child| (child, false))
            .collect();

        while let Some((share, expanded)) = stack.pop() {
            if expanded {
                ordered.push(share);
                continue;
            }
            if !visited.insert(share.id) {
                warn!(share_id = share.id, "Share tree contains a cycle");
                continue;
            }
            let children = self.shares.find_children(share.id).await?;
            stack.push((share, true));
            stack.extend(
                children
                    .into_iter()
                    .rev()
                    .filter(|c| !visited.contains(&c.id))
                    .map(|c| (c, false)),
            );
        }
        Ok(ordered)
    }
}

/// The hook representation of a share.
pub fn hook_params(share: &Share) -> ShareHookParams {
    ShareHookParams {
        id: share.id,
        item_type: share.item_type.clone(),
        item_source: share.item_source,
        share_type: share.share_type.code(),
        share_with: share.share_with.clone().unwrap_or_default(),
        item_parent: share.parent,
        uid_owner: share.uid_owner.clone(),
        file_source: share.file_source,
        file_target: share.file_target.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Fixture, RecordingHandler};
    use chrono::Duration;
    use cumulus_core::error::ErrorKind;

    async fn user_share(fx: &Fixture, by: &str, path: &str, with: &str, perms: i32) -> Share {
        let node = fx.resolver.get(by, path).await.expect("resolve").expect("exists");
        fx.shares
            .create_share(ShareRequest {
                share_type: 0,
                shared_with: Some(with.into()),
                shared_by: Some(by.into()),
                node: Some(node),
                permissions: Permissions(perms),
                ..ShareRequest::default()
            })
            .await
            .expect("share created")
    }

    async fn validation_message(fx: &Fixture, request: ShareRequest) -> String {
        let err = fx.shares.create_share(request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        err.message
    }

    #[tokio::test]
    async fn test_create_user_share_validation_order() {
        let fx = Fixture::new().await;
        let node = fx.resolver.get("alice", "docs").await.unwrap().unwrap();

        let mut request = ShareRequest { share_type: 2, ..ShareRequest::default() };
        assert_eq!(validation_message(&fx, request.clone()).await, "unknown share type");

        request.share_type = 0;
        assert_eq!(validation_message(&fx, request.clone()).await, "SharedWith should be a user");

        request.shared_with = Some("bob".into());
        assert_eq!(validation_message(&fx, request.clone()).await, "SharedBy should be set");

        request.shared_by = Some("alice".into());
        assert_eq!(validation_message(&fx, request.clone()).await, "Path should be set");

        let private = fx.resolver.get("alice", "private.txt").await.unwrap().unwrap();
        request.node = Some(private);
        assert_eq!(validation_message(&fx, request.clone()).await, "Path is not shareable");

        request.node = Some(fx.resolver.get("alice", "readonly.txt").await.unwrap().unwrap());
        assert_eq!(validation_message(&fx, request.clone()).await, "A share requires permissions");

        request.permissions = Permissions(3);
        assert_eq!(validation_message(&fx, request.clone()).await, "Cannot increase permissions");

        request.node = Some(node);
        let share = fx.shares.create_share(request).await.expect("created");
        assert_eq!(share.share_owner(), "alice");
        assert_eq!(share.file_target, "/docs");
        assert_eq!(share.item_type, "folder");
        assert!(share.token.is_none());
    }

    #[tokio::test]
    async fn test_group_share_requires_group() {
        let fx = Fixture::new().await;
        let request = ShareRequest {
            share_type: 1,
            shared_with: Some("nobody".into()),
            ..ShareRequest::default()
        };
        assert_eq!(validation_message(&fx, request).await, "SharedWith should be a group");
    }

    #[tokio::test]
    async fn test_link_share_policy() {
        let fx = Fixture::with_policy(SharingConfig {
            enforce_links_password: true,
            ..SharingConfig::default()
        })
        .await;
        let node = fx.resolver.get("alice", "docs").await.unwrap().unwrap();
        let mut request = ShareRequest {
            share_type: 3,
            shared_by: Some("alice".into()),
            node: Some(node),
            permissions: Permissions::READ,
            expiration: Some(Utc::now() - Duration::days(1)),
            ..ShareRequest::default()
        };
        assert_eq!(validation_message(&fx, request.clone()).await, "Expiration date is in the past");

        request.expiration = Some(Utc::now() + Duration::days(2));
        assert_eq!(
            validation_message(&fx, request.clone()).await,
            "Passwords are enforced for link shares"
        );

        request.password = Some("secret".into());
        let share = fx.shares.create_share(request).await.expect("link");
        assert_eq!(share.token.as_deref().map(str::len), Some(15));
        assert!(share.share_with.is_none());
        let expiration = share.expiration.expect("expiration");
        assert_eq!(expiration, crate::share::expiration::midnight(expiration));
        assert!(fx.shares.check_password(&share, "secret").unwrap());
        assert!(!fx.shares.check_password(&share, "wrong").unwrap());

        let by_token = fx
            .shares
            .get_share_by_token(share.token.as_deref().unwrap())
            .await
            .expect("by token");
        assert_eq!(by_token.id, share.id);

        let disabled = Fixture::with_policy(SharingConfig {
            allow_links: false,
            ..SharingConfig::default()
        })
        .await;
        let request = ShareRequest { share_type: 3, ..ShareRequest::default() };
        assert_eq!(validation_message(&disabled, request).await, "Link sharing not allowed");
    }

    #[tokio::test]
    async fn test_reshare_is_bounded_by_received_share() {
        let fx = Fixture::new().await;
        let root = user_share(&fx, "alice", "docs", "bob", 17).await;

        let node = fx.resolver.get("bob", "/docs/report.txt").await.unwrap().unwrap();
        assert_eq!(node.via_share.as_ref().map(|s| s.id), Some(root.id));
        assert_eq!(node.permissions, Permissions(17));

        let err = fx
            .shares
            .create_share(ShareRequest {
                share_type: 0,
                shared_with: Some("carol".into()),
                shared_by: Some("bob".into()),
                node: Some(node.clone()),
                permissions: Permissions(19),
                ..ShareRequest::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.message, "Cannot increase permissions");

        let reshare = user_share(&fx, "bob", "docs/report.txt", "carol", 1).await;
        assert_eq!(reshare.parent, Some(root.id));
        assert_eq!(reshare.uid_fileowner, "alice");
        assert_eq!(reshare.shared_by(), "bob");
    }

    #[tokio::test]
    async fn test_delete_cascade_order_and_hooks() {
        let fx = Fixture::new().await;
        let recorder = RecordingHandler::install(&fx.registry).await;

        // alice -> bob (root), bob -> carol (c1), carol -> dave (c1a), bob -> dave (c2)
        let root = user_share(&fx, "alice", "docs", "bob", 31).await;
        let c1 = user_share(&fx, "bob", "docs", "carol", 31).await;
        let c1a = user_share(&fx, "carol", "docs", "dave", 1).await;
        let c2 = user_share(&fx, "bob", "docs/report.txt", "dave", 1).await;
        assert_eq!(c1a.parent, Some(c1.id));
        assert_eq!(c2.parent, Some(root.id));
        recorder.clear().await;

        let deleted = fx.shares.delete_share(&root, Some("alice")).await.expect("delete");
        let order: Vec<i64> = deleted.iter().map(|s| s.id).collect();
        assert_eq!(order, vec![c1a.id, c1.id, c2.id, root.id]);

        for id in &order {
            assert!(fx.shares.get_share_by_id(*id).await.unwrap_err().is_not_found());
        }

        let events = recorder.events().await;
        assert_eq!(events.len(), 2);
        match &events[0] {
            ShareEvent::PreUnshare { share } => {
                assert_eq!(share.id, root.id);
                assert_eq!(share.share_with, "bob");
                assert_eq!(share.item_parent, None);
            }
            other => panic!("unexpected first event {other:?}"),
        }
        match &events[1] {
            ShareEvent::PostUnshare { share, deleted_shares } => {
                assert_eq!(share.id, root.id);
                let ids: Vec<i64> = deleted_shares.iter().map(|s| s.id).collect();
                assert_eq!(ids, order);
                assert_eq!(deleted_shares[0].item_parent, Some(c1.id));
            }
            other => panic!("unexpected second event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_requires_existing_share() {
        let fx = Fixture::new().await;
        let share = user_share(&fx, "alice", "docs", "bob", 1).await;

        let mut unsaved = share.clone();
        unsaved.id = 0;
        let err = fx.shares.delete_share(&unsaved, None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);

        fx.shares.delete_share(&share, None).await.expect("first delete");
        let err = fx.shares.delete_share(&share, None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_survives_parent_cycle() {
        let fx = Fixture::new().await;
        let a = user_share(&fx, "alice", "docs", "bob", 31).await;
        let b = user_share(&fx, "bob", "docs", "carol", 31).await;
        sqlx::query("UPDATE share SET parent = ? WHERE id = ?")
            .bind(b.id)
            .bind(a.id)
            .execute(fx.db.pool())
            .await
            .expect("corrupt tree");

        let deleted = fx.shares.delete_share(&a, None).await.expect("delete");
        let ids: Vec<i64> = deleted.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }
}
