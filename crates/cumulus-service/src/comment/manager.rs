//! Comments manager: validation, persistence and reply bookkeeping.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;
use tracing::{debug, info};

use cumulus_core::error::AppError;
use cumulus_core::result::AppResult;
use cumulus_core::types::pagination::PageRequest;
use cumulus_database::repositories::CommentRepository;
use cumulus_entity::comment::{Comment, DELETED_USERS_ACTOR};

/// A thread root with its replies, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct CommentTree {
    /// The requested comment.
    pub comment: Comment,
    /// Replies whose thread root is `comment`.
    pub replies: Vec<Comment>,
}

/// Manages comments and keeps parent reply counters up to date.
#[derive(Debug, Clone)]
pub struct CommentsManager {
    repo: Arc<CommentRepository>,
}

impl CommentsManager {
    /// Creates a new comments manager.
    pub fn new(repo: Arc<CommentRepository>) -> Self {
        Self { repo }
    }

    /// Create an unsaved comment.
    pub fn create(
        &self,
        actor_type: &str,
        actor_id: &str,
        object_type: &str,
        object_id: &str,
    ) -> AppResult<Comment> {
        if [actor_type, actor_id, object_type, object_id]
            .iter()
            .any(|s| s.is_empty())
        {
            return Err(AppError::validation(
                "Actor and object information must be non-empty strings",
            ));
        }
        Ok(Comment::new(actor_type, actor_id, object_type, object_id))
    }

    /// Fetch a comment by id.
    pub async fn get(&self, id: i64) -> AppResult<Comment> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Comment {id} not found")))
    }

    /// A comment and every reply in its thread. A `limit` of 0 returns all
    /// replies.
    pub async fn get_tree(&self, id: i64, limit: u64, offset: u64) -> AppResult<CommentTree> {
        let comment = self.get(id).await?;
        let replies = self
            .repo
            .find_thread(id, &PageRequest::new(limit, offset))
            .await?;
        Ok(CommentTree { comment, replies })
    }

    /// Comments on an object, newest first. With `not_older_than` only
    /// comments created strictly later are returned.
    pub async fn get_for_object(
        &self,
        object_type: &str,
        object_id: &str,
        limit: u64,
        offset: u64,
        not_older_than: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Comment>> {
        self.repo
            .find_for_object(
                object_type,
                object_id,
                &PageRequest::new(limit, offset),
                not_older_than,
            )
            .await
    }

    /// Number of comments on an object.
    pub async fn get_number_of_comments_for_object(
        &self,
        object_type: &str,
        object_id: &str,
    ) -> AppResult<i64> {
        self.repo.count_for_object(object_type, object_id).await
    }

    /// Insert or update a comment, then refresh the reply counters of
    /// every ancestor.
    ///
    /// On return `comment.id` and `comment.topmost_parent_id` hold the
    /// stored values.
    pub async fn save(&self, comment: &mut Comment) -> AppResult<()> {
        if !comment.has_required_fields() {
            return Err(AppError::validation(
                "Actor, Object and Verb information must be provided for saving",
            ));
        }

        comment.creation_timestamp = comment.creation_timestamp.trunc_subsecs(0);
        if !comment.is_persisted() {
            comment.children_count = 0;
            comment.latest_child_timestamp = None;
        }
        comment.topmost_parent_id = if comment.is_root() {
            0
        } else {
            self.topmost_parent(comment.parent_id, comment.id).await?
        };

        if comment.is_persisted() {
            if self.repo.update(comment).await? == 0 {
                return Err(AppError::not_found(format!(
                    "Comment {} not found",
                    comment.id
                )));
            }
            debug!(comment_id = comment.id, "Comment updated");
        } else {
            comment.id = self.repo.insert(comment).await?;
            info!(
                comment_id = comment.id,
                parent_id = comment.parent_id,
                object_type = %comment.object_type,
                object_id = %comment.object_id,
                "Comment created"
            );
        }

        self.update_ancestors(comment).await
    }

    /// Follow parent links up to the thread root.
    async fn topmost_parent(&self, parent_id: i64, own_id: i64) -> AppResult<i64> {
        let mut visited = HashSet::from([own_id]);
        let mut current = parent_id;
        loop {
            if !visited.insert(current) {
                return Err(AppError::validation("Comment parents form a cycle"));
            }
            let parent = self.get(current).await?;
            if parent.is_root() {
                return Ok(parent.id);
            }
            current = parent.parent_id;
        }
    }

    /// Each parent's reply count is recounted and its latest child time set
    /// to the creation time of the comment below it.
    async fn update_ancestors(&self, comment: &Comment) -> AppResult<()> {
        let mut visited = HashSet::from([comment.id]);
        let mut child_id = comment.parent_id;
        let mut child_created = comment.creation_timestamp;

        while child_id != 0 && visited.insert(child_id) {
            let mut parent = self.get(child_id).await?;
            parent.children_count = self.repo.count_children(parent.id).await?;
            parent.latest_child_timestamp = Some(child_created);
            self.repo.update(&parent).await?;

            child_id = parent.parent_id;
            child_created = parent.creation_timestamp;
        }
        Ok(())
    }

    /// Delete a comment. Returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> AppResult<bool> {
        let deleted = self.repo.delete(id).await? > 0;
        if deleted {
            info!(comment_id = id, "Comment deleted");
        }
        Ok(deleted)
    }

    /// Anonymise every comment written by an actor.
    pub async fn delete_references_of_actor(&self, actor_type: &str, actor_id: &str) -> AppResult<u64> {
        if actor_type.is_empty() || actor_id.is_empty() {
            return Err(AppError::validation("Actor information must be provided"));
        }
        let rows = self
            .repo
            .rewrite_actor(actor_type, actor_id, DELETED_USERS_ACTOR, DELETED_USERS_ACTOR)
            .await?;
        info!(actor_type, actor_id, rows, "Comment actor references removed");
        Ok(rows)
    }

    /// Delete every comment on an object.
    pub async fn delete_comments_at_object(&self, object_type: &str, object_id: &str) -> AppResult<u64> {
        if object_type.is_empty() || object_id.is_empty() {
            return Err(AppError::validation("Object information must be provided"));
        }
        let rows = self.repo.delete_for_object(object_type, object_id).await?;
        info!(object_type, object_id, rows, "Object comments deleted");
        Ok(rows)
    }
}
