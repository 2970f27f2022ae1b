// `folio texts`: manage the texts of a workspace.

use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Subcommand};
use folio_client::{QueryCache, TextInput, TextsHook};
use folio_common::types::Text;
use serde_json::json;
use uuid::Uuid;

use super::Session;
use crate::output;

#[derive(Debug, Subcommand)]
pub enum TextsCommand {
    /// List texts, newest first
    List,
    /// Count texts in the workspace
    Count,
    /// Create a text
    Create(TextFields),
    /// Update fields of a text
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: TextFields,
    },
    /// Delete a text (admin only)
    Delete { id: Uuid },
}

#[derive(Debug, Args)]
pub struct TextFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    content: Option<String>,
    /// draft, published or archived
    #[arg(long)]
    status: Option<String>,
}

impl From<TextFields> for TextInput {
    fn from(fields: TextFields) -> Self {
        Self { title: fields.title, content: fields.content, status: fields.status }
    }
}

pub async fn run(session: &Session, command: TextsCommand) -> anyhow::Result<()> {
    let hook = TextsHook::new(
        session.api.clone(),
        Arc::new(QueryCache::new()),
        session.workspace_id,
        session.user_id.clone(),
    )
    .with_strategy(session.strategy);

    match command {
        TextsCommand::List => {
            let texts = hook.load().await.context("listing texts")?;
            output::print_output(session.format, &json!({ "texts": texts }), |_| format_list(&texts))?;
        }
        TextsCommand::Count => {
            let count = session.api.count_texts(session.workspace_id).await.context("counting texts")?;
            output::print_output(session.format, &json!({ "count": count }), |_| {
                format!("{count} text(s)")
            })?;
        }
        TextsCommand::Create(fields) => {
            let text = hook.create(fields.into()).await.context("creating text")?;
            output::print_output(session.format, &json!({ "text": text }), |_| {
                format!("Created {}", format_line(&text))
            })?;
        }
        TextsCommand::Update { id, fields } => {
            let text = hook.update(id, fields.into()).await.context("updating text")?;
            output::print_output(session.format, &json!({ "text": text }), |_| {
                format!("Updated {}", format_line(&text))
            })?;
        }
        TextsCommand::Delete { id } => {
            let deleted = hook.delete(id).await.context("deleting text")?;
            output::print_output(session.format, &json!({ "deleted": deleted }), |_| {
                format!("Deleted text {id}")
            })?;
        }
    }
    Ok(())
}

fn format_line(text: &Text) -> String {
    format!("{}  {:<9}  {}", text.id, text.status.as_str(), text.title)
}

fn format_list(texts: &[Text]) -> String {
    if texts.is_empty() {
        return "No texts in workspace.".into();
    }
    let mut lines = vec![format!("{} text(s)", texts.len())];
    lines.extend(texts.iter().map(|text| format!("  {}", format_line(text))));
    lines.join("\n")
}
