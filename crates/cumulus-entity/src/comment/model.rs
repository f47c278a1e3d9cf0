//! Comment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Actor type and id written over the actor of comments whose author
/// was removed.
pub const DELETED_USERS_ACTOR: &str = "deleted_users";

/// A threaded comment attached to an object.
///
/// `id == 0` marks a comment that was never saved, `parent_id == 0`
/// marks a root comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Comment {
    /// Row id, 0 until persisted.
    pub id: i64,
    /// Direct parent, 0 for a root comment.
    pub parent_id: i64,
    /// Root of the thread, 0 for a root comment.
    pub topmost_parent_id: i64,
    /// Number of direct replies.
    pub children_count: i64,
    /// Kind of actor, usually `users`.
    pub actor_type: String,
    /// Actor identifier.
    pub actor_id: String,
    /// Comment body.
    pub message: String,
    /// Verb, usually `comment`.
    pub verb: String,
    /// When the comment was written.
    pub creation_timestamp: DateTime<Utc>,
    /// Creation time of the most recently saved reply.
    pub latest_child_timestamp: Option<DateTime<Utc>>,
    /// Kind of object commented on, usually `files`.
    pub object_type: String,
    /// Object identifier.
    pub object_id: String,
}

impl Comment {
    /// Create an unsaved comment for the given actor and object.
    pub fn new(
        actor_type: impl Into<String>,
        actor_id: impl Into<String>,
        object_type: impl Into<String>,
        object_id: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            parent_id: 0,
            topmost_parent_id: 0,
            children_count: 0,
            actor_type: actor_type.into(),
            actor_id: actor_id.into(),
            message: String::new(),
            verb: String::new(),
            creation_timestamp: Utc::now(),
            latest_child_timestamp: None,
            object_type: object_type.into(),
            object_id: object_id.into(),
        }
    }

    /// Whether the comment has been written to storage.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Whether the comment starts a thread.
    pub fn is_root(&self) -> bool {
        self.parent_id == 0
    }

    /// Whether actor, object and verb are all present.
    pub fn has_required_fields(&self) -> bool {
        [
            &self.actor_type,
            &self.actor_id,
            &self.object_type,
            &self.object_id,
            &self.verb,
        ]
        .iter()
        .all(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_comment_is_unsaved_root() {
        let comment = Comment::new("users", "alice", "files", "42");
        assert!(!comment.is_persisted());
        assert!(comment.is_root());
        assert_eq!(comment.children_count, 0);
    }

    #[test]
    fn test_verb_is_required() {
        let mut comment = Comment::new("users", "alice", "files", "42");
        assert!(!comment.has_required_fields());
        comment.verb = "comment".into();
        assert!(comment.has_required_fields());
    }
}
