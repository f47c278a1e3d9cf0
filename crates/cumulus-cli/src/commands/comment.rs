//! Comment inspection and maintenance.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::repositories::CommentRepository;
use cumulus_entity::comment::Comment;
use cumulus_service::CommentsManager;

/// Arguments for comment commands
#[derive(Debug, Args)]
pub struct CommentArgs {
    /// Comment subcommand
    #[command(subcommand)]
    pub command: CommentCommand,
}

/// Comment subcommands
#[derive(Debug, Subcommand)]
pub enum CommentCommand {
    /// Comments on an object, newest first
    List {
        /// Object type, e.g. `files`
        object_type: String,
        /// Object id
        object_id: String,
        /// Maximum number of comments, 0 for all
        #[arg(long, default_value_t = 0)]
        limit: u64,
        /// Number of comments to skip
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
    /// A comment and the replies of its thread
    Thread {
        /// Comment id
        id: i64,
    },
    /// Post a comment
    Add {
        /// Object type
        object_type: String,
        /// Object id
        object_id: String,
        /// Comment text
        message: String,
        /// Author
        #[arg(long)]
        actor: String,
        /// Actor type
        #[arg(long, default_value = "users")]
        actor_type: String,
        /// Comment being replied to
        #[arg(long)]
        parent: Option<i64>,
    },
    /// Delete a comment
    Delete {
        /// Comment id
        id: i64,
    },
    /// Mark every comment of an actor as written by a deleted user
    ForgetActor {
        /// Actor id
        actor: String,
        /// Actor type
        #[arg(long, default_value = "users")]
        actor_type: String,
    },
    /// Delete all comments on an object
    Purge {
        /// Object type
        object_type: String,
        /// Object id
        object_id: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct CommentRow {
    id: i64,
    parent: i64,
    thread: i64,
    replies: i64,
    actor: String,
    verb: String,
    message: String,
    created: String,
}

impl From<&Comment> for CommentRow {
    fn from(c: &Comment) -> Self {
        Self {
            id: c.id,
            parent: c.parent_id,
            thread: c.topmost_parent_id,
            replies: c.children_count,
            actor: format!("{}/{}", c.actor_type, c.actor_id),
            verb: c.verb.clone(),
            message: c.message.clone(),
            created: c.creation_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// Execute comment commands
pub async fn execute(
    args: &CommentArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let comments = CommentsManager::new(Arc::new(CommentRepository::new(pool)));

    match &args.command {
        CommentCommand::List {
            object_type,
            object_id,
            limit,
            offset,
        } => {
            let rows: Vec<CommentRow> = comments
                .get_for_object(object_type, object_id, *limit, *offset, None)
                .await?
                .iter()
                .map(CommentRow::from)
                .collect();
            output::print_list(&rows, format);
            let total = comments
                .get_number_of_comments_for_object(object_type, object_id)
                .await?;
            output::print_kv("total", &total.to_string());
        }
        CommentCommand::Thread { id } => {
            let tree = comments.get_tree(*id, 0, 0).await?;
            let rows: Vec<CommentRow> = std::iter::once(&tree.comment)
                .chain(tree.replies.iter())
                .map(CommentRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        CommentCommand::Add {
            object_type,
            object_id,
            message,
            actor,
            actor_type,
            parent,
        } => {
            let mut comment = comments.create(actor_type, actor, object_type, object_id)?;
            comment.verb = "comment".to_string();
            comment.message = message.clone();
            comment.parent_id = parent.unwrap_or(0);
            comments.save(&mut comment).await?;
            output::print_item(&CommentRow::from(&comment), format);
        }
        CommentCommand::Delete { id } => {
            if comments.delete(*id).await? {
                output::print_success(&format!("Comment {id} deleted"));
            } else {
                return Err(AppError::not_found(format!("Comment {id} not found")));
            }
        }
        CommentCommand::ForgetActor { actor, actor_type } => {
            let changed = comments.delete_references_of_actor(actor_type, actor).await?;
            output::print_success(&format!("Rewrote {changed} comment(s)"));
        }
        CommentCommand::Purge {
            object_type,
            object_id,
        } => {
            let deleted = comments.delete_comments_at_object(object_type, object_id).await?;
            output::print_success(&format!("Deleted {deleted} comment(s)"));
        }
    }

    Ok(())
}
