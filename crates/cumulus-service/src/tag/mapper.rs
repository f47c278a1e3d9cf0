//! Assignment of system tags to objects.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use cumulus_core::result::AppResult;
use cumulus_database::repositories::SystemTagRepository;

use super::manager::SystemTagManager;

/// Maps tags to objects such as files.
#[derive(Debug, Clone)]
pub struct SystemTagObjectMapper {
    repo: Arc<SystemTagRepository>,
    tags: SystemTagManager,
}

impl SystemTagObjectMapper {
    /// Creates a new mapper.
    pub fn new(repo: Arc<SystemTagRepository>) -> Self {
        Self {
            tags: SystemTagManager::new(repo.clone()),
            repo,
        }
    }

    /// Tag ids of each object. Every requested object is present in the
    /// result.
    pub async fn get_tag_ids_for_objects(
        &self,
        object_type: &str,
        object_ids: &[String],
    ) -> AppResult<HashMap<String, Vec<i64>>> {
        self.repo.tag_ids_for_objects(object_type, object_ids).await
    }

    /// Objects of a type carrying any of the tags. Unknown tags fail.
    pub async fn get_object_ids_for_tags(
        &self,
        object_type: &str,
        tag_ids: &[i64],
    ) -> AppResult<Vec<String>> {
        self.tags.get_tags_by_id(tag_ids).await?;
        self.repo.object_ids_for_tags(object_type, tag_ids).await
    }

    /// Assign tags to an object. Unknown tags fail; already assigned tags
    /// are left alone.
    pub async fn assign_tags(&self, object_type: &str, object_id: &str, tag_ids: &[i64]) -> AppResult<()> {
        self.tags.get_tags_by_id(tag_ids).await?;
        self.repo.assign(object_type, object_id, tag_ids).await?;
        info!(object_type, object_id, tags = ?tag_ids, "System tags assigned");
        Ok(())
    }

    /// Remove tags from an object. Unknown tags fail.
    pub async fn unassign_tags(&self, object_type: &str, object_id: &str, tag_ids: &[i64]) -> AppResult<u64> {
        self.tags.get_tags_by_id(tag_ids).await?;
        let removed = self.repo.unassign(object_type, object_id, tag_ids).await?;
        info!(object_type, object_id, removed, "System tags unassigned");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cumulus_database::DatabasePool;

    #[tokio::test]
    async fn test_assign_and_lookup() {
        let db = DatabasePool::in_memory().await.expect("database");
        let repo = Arc::new(SystemTagRepository::new(db.into_pool()));
        let tags = SystemTagManager::new(repo.clone());
        let mapper = SystemTagObjectMapper::new(repo);

        let red = tags.create_tag("red", true, true).await.unwrap();
        let blue = tags.create_tag("blue", true, true).await.unwrap();

        mapper.assign_tags("files", "10", &[red.id, blue.id]).await.unwrap();
        mapper.assign_tags("files", "10", &[red.id]).await.unwrap();
        mapper.assign_tags("files", "11", &[blue.id]).await.unwrap();
        assert!(mapper.assign_tags("files", "11", &[999]).await.unwrap_err().is_not_found());

        let ids = vec!["10".to_string(), "11".to_string(), "12".to_string()];
        let map = mapper.get_tag_ids_for_objects("files", &ids).await.unwrap();
        let mut ten = map["10"].clone();
        ten.sort_unstable();
        let mut expected = vec![red.id, blue.id];
        expected.sort_unstable();
        assert_eq!(ten, expected);
        assert_eq!(map["11"], vec![blue.id]);
        assert!(map["12"].is_empty());

        assert_eq!(
            mapper.get_object_ids_for_tags("files", &[blue.id]).await.unwrap(),
            vec!["10", "11"]
        );

        assert_eq!(mapper.unassign_tags("files", "10", &[blue.id]).await.unwrap(), 1);
        tags.delete_tags(&[red.id]).await.unwrap();
        let map = mapper.get_tag_ids_for_objects("files", &ids).await.unwrap();
        assert!(map["10"].is_empty());
    }
}
