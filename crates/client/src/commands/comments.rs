// `folio comments`: manage the comments of a text.

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Subcommand};
use folio_client::{CommentInput, CommentsHook, QueryCache};
use folio_common::types::Comment;
use serde_json::json;
use uuid::Uuid;

use super::Session;
use crate::output;

#[derive(Debug, Subcommand)]
pub enum CommentsCommand {
    /// List comments on a text, oldest first
    List { text_id: Uuid },
    /// Comment on a text
    Create {
        text_id: Uuid,
        #[command(flatten)]
        fields: CommentFields,
        /// Reply to an existing comment on the same text
        #[arg(long)]
        reply_to: Option<Uuid>,
    },
    /// Update a comment
    Update {
        text_id: Uuid,
        id: Uuid,
        #[command(flatten)]
        fields: CommentFields,
    },
    /// Delete a comment (admin only)
    Delete { text_id: Uuid, id: Uuid },
}

#[derive(Debug, Args)]
pub struct CommentFields {
    #[arg(long)]
    content: Option<String>,
    /// draft, published or archived
    #[arg(long)]
    status: Option<String>,
}

impl CommentFields {
    fn into_input(self, parent_id: Option<Uuid>) -> CommentInput {
        CommentInput { content: self.content, status: self.status, parent_id }
    }
}

pub async fn run(session: &Session, command: CommentsCommand) -> anyhow::Result<()> {
    let hook = |text_id: Uuid| {
        CommentsHook::new(
            session.api.clone(),
            Arc::new(QueryCache::new()),
            session.workspace_id,
            text_id,
            session.user_id.clone(),
        )
        .with_display_name(session.display_name.clone())
        .with_strategy(session.strategy)
    };

    match command {
        CommentsCommand::List { text_id } => {
            let comments = hook(text_id).load().await.context("listing comments")?;
            output::print_output(session.format, &json!({ "comments": comments }), |_| {
                format_list(&comments)
            })?;
        }
        CommentsCommand::Create { text_id, fields, reply_to } => {
            let comment = hook(text_id)
                .create(fields.into_input(reply_to))
                .await
                .context("creating comment")?;
            output::print_output(session.format, &json!({ "comment": comment }), |_| {
                format!("Created {}", format_line(&comment))
            })?;
        }
        CommentsCommand::Update { text_id, id, fields } => {
            let comment =
                hook(text_id).update(id, fields.into_input(None)).await.context("updating comment")?;
            output::print_output(session.format, &json!({ "comment": comment }), |_| {
                format!("Updated {}", format_line(&comment))
            })?;
        }
        CommentsCommand::Delete { text_id, id } => {
            let deleted = hook(text_id).delete(id).await.context("deleting comment")?;
            output::print_output(session.format, &json!({ "deleted": deleted }), |_| {
                format!("Deleted comment {id}")
            })?;
        }
    }
    Ok(())
}

fn format_line(comment: &Comment) -> String {
    let reply = comment.parent_id.map(|parent| format!(" (reply to {parent})")).unwrap_or_default();
    format!("{}  {}: {}{reply}", comment.id, comment.author_name, comment.content)
}

fn format_list(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "No comments on this text.".into();
    }
    let mut lines = vec![format!("{} comment(s)", comments.len())];
    lines.extend(comments.iter().map(|comment| format!("  {}", format_line(comment))));
    lines.join("\n")
}
