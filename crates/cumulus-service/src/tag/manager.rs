//! System tag manager.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_database::repositories::SystemTagRepository;
use cumulus_entity::tag::SystemTag;

/// CRUD over administrator-defined tags.
#[derive(Debug, Clone)]
pub struct SystemTagManager {
    repo: Arc<SystemTagRepository>,
}

impl SystemTagManager {
    /// Creates a new tag manager.
    pub fn new(repo: Arc<SystemTagRepository>) -> Self {
        Self { repo }
    }

    /// Fetch tags by id. Fails when any id is unknown.
    pub async fn get_tags_by_id(&self, ids: &[i64]) -> AppResult<Vec<SystemTag>> {
        let tags = self.repo.find_by_ids(ids).await?;
        let found: HashSet<i64> = tags.iter().map(|t| t.id).collect();
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !found.contains(id))
            .map(i64::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::not_found(format!(
                "Tag id(s) not found: {}",
                missing.join(", ")
            )));
        }
        Ok(tags)
    }

    /// All tags, optionally only those with the given visibility and those
    /// whose name contains `name_search`.
    pub async fn get_all_tags(
        &self,
        visibility: Option<bool>,
        name_search: Option<&str>,
    ) -> AppResult<Vec<SystemTag>> {
        self.repo.find_all(visibility, name_search).await
    }

    /// Fetch a tag by its identity tuple.
    pub async fn get_tag(&self, name: &str, visible: bool, assignable: bool) -> AppResult<SystemTag> {
        self.repo
            .find_by_identity(name, visible, assignable)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Tag ({}) does not exist",
                    SystemTag::describe(name, visible, assignable)
                ))
            })
    }

    /// Create a tag.
    pub async fn create_tag(&self, name: &str, visible: bool, assignable: bool) -> AppResult<SystemTag> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Tag name must not be empty"));
        }
        let tag = self.repo.insert(name, visible, assignable).await?;
        info!(tag_id = tag.id, name = %tag.name, visible, assignable, "System tag created");
        Ok(tag)
    }

    /// Rewrite the identity tuple of an existing tag.
    pub async fn update_tag(
        &self,
        id: i64,
        name: &str,
        visible: bool,
        assignable: bool,
    ) -> AppResult<SystemTag> {
        if name.trim().is_empty() {
            return Err(AppError::validation("Tag name must not be empty"));
        }
        if self.repo.update(id, name, visible, assignable).await? == 0 {
            return Err(AppError::not_found(format!("Tag id(s) not found: {id}")));
        }
        info!(tag_id = id, name, visible, assignable, "System tag updated");
        Ok(SystemTag {
            id,
            name: name.to_string(),
            user_visible: visible,
            user_assignable: assignable,
        })
    }

    /// Delete tags together with their object relations.
    pub async fn delete_tags(&self, ids: &[i64]) -> AppResult<u64> {
        let deleted = self.repo.delete(ids).await?;
        if deleted == 0 {
            let list: Vec<String> = ids.iter().map(i64::to_string).collect();
            return Err(AppError::not_found(format!(
                "Tag id(s) not found: {}",
                list.join(", ")
            )));
        }
        info!(count = deleted, "System tags deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_database::DatabasePool;

    async fn manager() -> SystemTagManager {
        let db = DatabasePool::in_memory().await.expect("database");
        SystemTagManager::new(Arc::new(SystemTagRepository::new(db.into_pool())))
    }

    #[tokio::test]
    async fn test_duplicate_identity_conflicts() {
        let manager = manager().await;
        manager.create_tag("urgent", true, true).await.unwrap();
        manager.create_tag("urgent", false, true).await.unwrap();

        let err = manager.create_tag("urgent", true, true).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(
            err.message,
            "Tag (urgent, visible: true, assignable: true) already exists"
        );
    }

    #[tokio::test]
    async fn test_search_is_literal_and_ordered() {
        let manager = manager().await;
        for name in ["b_tag", "bxtag", "a_tag", "100%"] {
            manager.create_tag(name, true, true).await.unwrap();
        }
        manager.create_tag("a_tag", false, false).await.unwrap();

        let names = |tags: Vec<SystemTag>| tags.into_iter().map(|t| t.name).collect::<Vec<_>>();
        assert_eq!(
            names(manager.get_all_tags(None, Some("_")).await.unwrap()),
            vec!["a_tag", "a_tag", "b_tag"]
        );
        assert_eq!(names(manager.get_all_tags(None, Some("%")).await.unwrap()), vec!["100%"]);
        assert_eq!(manager.get_all_tags(Some(false), None).await.unwrap().len(), 1);
        assert_eq!(manager.get_all_tags(None, None).await.unwrap().len(), 5);

        let first = manager.get_all_tags(None, Some("a_")).await.unwrap();
        assert!(!first[0].user_visible);
        assert!(first[1].user_visible);
    }

    #[tokio::test]
    async fn test_get_update_delete() {
        let manager = manager().await;
        let tag = manager.create_tag("draft", true, false).await.unwrap();
        assert_eq!(manager.get_tag("draft", true, false).await.unwrap().id, tag.id);
        assert!(manager.get_tag("draft", true, true).await.unwrap_err().is_not_found());

        let err = manager.get_tags_by_id(&[tag.id, 999]).await.unwrap_err();
        assert_eq!(err.message, "Tag id(s) not found: 999");

        let updated = manager.update_tag(tag.id, "final", true, true).await.unwrap();
        assert_eq!(manager.get_tags_by_id(&[tag.id]).await.unwrap(), vec![updated]);
        assert!(manager.update_tag(999, "x", true, true).await.unwrap_err().is_not_found());

        let other = manager.create_tag("other", true, true).await.unwrap();
        let err = manager.update_tag(other.id, "final", true, true).await.unwrap_err();
        assert!(err.is_conflict());

        assert_eq!(manager.delete_tags(&[tag.id, other.id]).await.unwrap(), 2);
        assert!(manager.delete_tags(&[tag.id]).await.unwrap_err().is_not_found());
    }
}
