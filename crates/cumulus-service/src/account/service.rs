//! Account administration: users, groups and memberships.

use std::sync::Arc;

use tracing::info;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::types::pagination::{PageRequest, PageResponse};
use cumulus_database::repositories::{GroupRepository, UserRepository};
use cumulus_entity::user::{CreateUser, Group, User};

/// Manages user accounts and group membership.
#[derive(Debug, Clone)]
pub struct AccountService {
    users: Arc<UserRepository>,
    groups: Arc<GroupRepository>,
}

fn validate_id(kind: &str, id: &str) -> AppResult<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '-'));
    if valid {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Only the following characters are allowed in a {kind}: \"a-z\", \"A-Z\", \"0-9\", and \"_.@-\""
        )))
    }
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(users: Arc<UserRepository>, groups: Arc<GroupRepository>) -> Self {
        Self { users, groups }
    }

    /// Create a user account.
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        validate_id("username", &data.uid)?;
        let user = self.users.create(&data).await?;
        info!(uid = %user.uid, backend = %user.backend, "User created");
        Ok(user)
    }

    /// Fetch a user.
    pub async fn get_user(&self, uid: &str) -> AppResult<User> {
        self.users
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{uid}' not found")))
    }

    /// One page of users ordered by uid.
    pub async fn list_users(&self, page: PageRequest) -> AppResult<PageResponse<User>> {
        let items = self.users.list(&page).await?;
        let total = self.users.count().await?;
        Ok(PageResponse::new(items, page, total.max(0) as u64))
    }

    /// Change a user's display name.
    pub async fn set_display_name(&self, uid: &str, display_name: &str) -> AppResult<()> {
        if !self.users.update_display_name(uid, display_name).await? {
            return Err(AppError::not_found(format!("User '{uid}' not found")));
        }
        info!(uid, display_name, "Display name changed");
        Ok(())
    }

    /// Create a group.
    pub async fn create_group(&self, gid: &str, display_name: Option<&str>) -> AppResult<Group> {
        validate_id("group name", gid)?;
        let group = self.groups.create(gid, display_name.unwrap_or(gid)).await?;
        info!(gid, "Group created");
        Ok(group)
    }

    /// All groups ordered by gid.
    pub async fn list_groups(&self) -> AppResult<Vec<Group>> {
        self.groups.list().await
    }

    /// Add a user to a group. Both must exist.
    pub async fn add_to_group(&self, gid: &str, uid: &str) -> AppResult<()> {
        self.get_user(uid).await?;
        if self.groups.find_by_gid(gid).await?.is_none() {
            return Err(AppError::not_found(format!("Group '{gid}' not found")));
        }
        self.groups.add_member(gid, uid).await?;
        info!(gid, uid, "User added to group");
        Ok(())
    }

    /// Remove a user from a group. Returns whether they were a member.
    pub async fn remove_from_group(&self, gid: &str, uid: &str) -> AppResult<bool> {
        let removed = self.groups.remove_member(gid, uid).await?;
        if removed {
            info!(gid, uid, "User removed from group");
        }
        Ok(removed)
    }

    /// Uids of a group's members.
    pub async fn group_members(&self, gid: &str) -> AppResult<Vec<String>> {
        self.groups.members(gid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_database::DatabasePool;

    async fn service() -> AccountService {
        let db = DatabasePool::in_memory().await.expect("database");
        AccountService::new(
            Arc::new(UserRepository::new(db.pool().clone())),
            Arc::new(GroupRepository::new(db.into_pool())),
        )
    }

    fn user(uid: &str) -> CreateUser {
        CreateUser {
            uid: uid.into(),
            display_name: uid.to_uppercase(),
            ..CreateUser::default()
        }
    }

    #[tokio::test]
    async fn test_users_and_groups() {
        let service = service().await;
        service.create_user(user("bob")).await.unwrap();
        service.create_user(user("alice")).await.unwrap();
        assert!(service.create_user(user("alice")).await.unwrap_err().is_conflict());
        assert!(service.create_user(user("no spaces")).await.is_err());

        let page = service.list_users(PageRequest::new(1, 0)).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].uid, "alice");
        assert!(page.has_more());

        service.create_group("staff", None).await.unwrap();
        service.add_to_group("staff", "bob").await.unwrap();
        assert!(service.add_to_group("staff", "nobody").await.unwrap_err().is_not_found());
        assert!(service.add_to_group("ghosts", "bob").await.unwrap_err().is_not_found());
        assert_eq!(service.group_members("staff").await.unwrap(), vec!["bob"]);

        assert!(service.remove_from_group("staff", "bob").await.unwrap());
        assert!(!service.remove_from_group("staff", "bob").await.unwrap());

        service.set_display_name("alice", "Alice A.").await.unwrap();
        assert_eq!(service.get_user("alice").await.unwrap().display_name, "Alice A.");
        assert!(service.set_display_name("nobody", "x").await.unwrap_err().is_not_found());
    }
}
