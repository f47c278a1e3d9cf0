//! System tag administration.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use cumulus_core::config::AppConfig;
use cumulus_core::error::AppError;
use cumulus_database::repositories::SystemTagRepository;
use cumulus_entity::tag::SystemTag;
use cumulus_service::{SystemTagManager, SystemTagObjectMapper};

/// Arguments for tag commands
#[derive(Debug, Args)]
pub struct TagArgs {
    /// Tag subcommand
    #[command(subcommand)]
    pub command: TagCommand,
}

/// Tag subcommands
#[derive(Debug, Subcommand)]
pub enum TagCommand {
    /// List tags
    List {
        /// Only tags with this visibility
        #[arg(long)]
        visible: Option<bool>,
        /// Only tags whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },
    /// Create a tag
    Add {
        /// Tag name
        name: String,
        /// Hide the tag from regular users
        #[arg(long)]
        invisible: bool,
        /// Prevent regular users from assigning the tag
        #[arg(long)]
        restricted: bool,
    },
    /// Change a tag
    Edit {
        /// Tag id
        id: i64,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New visibility
        #[arg(long)]
        visible: Option<bool>,
        /// New assignability
        #[arg(long)]
        assignable: Option<bool>,
    },
    /// Delete tags and their assignments
    Delete {
        /// Tag ids
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Assign tags to an object
    Assign {
        /// Object type, e.g. `files`
        object_type: String,
        /// Object id
        object_id: String,
        /// Tag ids
        #[arg(required = true)]
        tag_ids: Vec<i64>,
    },
    /// Remove tags from an object
    Unassign {
        /// Object type
        object_type: String,
        /// Object id
        object_id: String,
        /// Tag ids
        #[arg(required = true)]
        tag_ids: Vec<i64>,
    },
    /// Objects carrying any of the tags
    Objects {
        /// Object type
        object_type: String,
        /// Tag ids
        #[arg(required = true)]
        tag_ids: Vec<i64>,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct TagRow {
    id: i64,
    name: String,
    visible: bool,
    assignable: bool,
}

impl From<&SystemTag> for TagRow {
    fn from(t: &SystemTag) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            visible: t.user_visible,
            assignable: t.user_assignable,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct ObjectRow {
    object_id: String,
}

/// Execute tag commands
pub async fn execute(
    args: &TagArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::create_db_pool(config).await?;
    let repo = Arc::new(SystemTagRepository::new(pool));
    let tags = SystemTagManager::new(Arc::clone(&repo));
    let mapper = SystemTagObjectMapper::new(repo);

    match &args.command {
        TagCommand::List { visible, search } => {
            let rows: Vec<TagRow> = tags
                .get_all_tags(*visible, search.as_deref())
                .await?
                .iter()
                .map(TagRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        TagCommand::Add {
            name,
            invisible,
            restricted,
        } => {
            let tag = tags.create_tag(name, !invisible, !restricted).await?;
            output::print_item(&TagRow::from(&tag), format);
        }
        TagCommand::Edit {
            id,
            name,
            visible,
            assignable,
        } => {
            let current = tags
                .get_tags_by_id(&[*id])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| AppError::not_found(format!("Tag id(s) not found: {id}")))?;
            let tag = tags
                .update_tag(
                    *id,
                    name.as_deref().unwrap_or(&current.name),
                    visible.unwrap_or(current.user_visible),
                    assignable.unwrap_or(current.user_assignable),
                )
                .await?;
            output::print_item(&TagRow::from(&tag), format);
        }
        TagCommand::Delete { ids } => {
            let deleted = tags.delete_tags(ids).await?;
            output::print_success(&format!("Deleted {deleted} tag(s)"));
        }
        TagCommand::Assign {
            object_type,
            object_id,
            tag_ids,
        } => {
            mapper.assign_tags(object_type, object_id, tag_ids).await?;
            output::print_success(&format!("Tagged {object_type}/{object_id}"));
        }
        TagCommand::Unassign {
            object_type,
            object_id,
            tag_ids,
        } => {
            let removed = mapper.unassign_tags(object_type, object_id, tag_ids).await?;
            output::print_success(&format!("Removed {removed} tag(s) from {object_type}/{object_id}"));
        }
        TagCommand::Objects {
            object_type,
            tag_ids,
        } => {
            let rows: Vec<ObjectRow> = mapper
                .get_object_ids_for_tags(object_type, tag_ids)
                .await?
                .into_iter()
                .map(|object_id| ObjectRow { object_id })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
