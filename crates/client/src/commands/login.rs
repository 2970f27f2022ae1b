// `folio login` / `folio config`: manage stored credentials.

use anyhow::{bail, Context};
use clap::Args;
use folio_client::config::{self, ClientConfig};
use folio_common::roles::{WorkspaceRole, WorkspaceToken};
use serde::Serialize;
use uuid::Uuid;

use super::GlobalArgs;
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Identity token issued by the server.
    #[arg(long)]
    identity: Option<String>,
    /// User id the identity token belongs to.
    #[arg(long)]
    user: Option<String>,
    /// Display name shown on your comments.
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    base_url: Option<String>,
    /// Workspace token for the workspace given with --workspace.
    #[arg(long)]
    token: Option<String>,
    /// Role the workspace token grants (admin or editor).
    #[arg(long, default_value = "editor")]
    role: String,
}

/// Stored configuration with secrets left out.
#[derive(Debug, Serialize)]
struct ConfigSummary {
    path: String,
    base_url: String,
    user_id: Option<String>,
    display_name: Option<String>,
    has_identity_token: bool,
    workspaces: Vec<WorkspaceSummary>,
}

#[derive(Debug, Serialize)]
struct WorkspaceSummary {
    workspace_id: Uuid,
    role: WorkspaceRole,
}

pub fn run(global: &GlobalArgs, args: LoginArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = config::resolve_path(global.config.clone())?;
    let mut config = ClientConfig::load_from(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    apply(&mut config, global.workspace, args)?;
    config.save_to(&path).with_context(|| format!("failed to save {}", path.display()))?;
    print_summary(format, &path, &config)
}

pub fn show(global: &GlobalArgs, format: OutputFormat) -> anyhow::Result<()> {
    let path = config::resolve_path(global.config.clone())?;
    let config = ClientConfig::load_from(&path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    print_summary(format, &path, &config)
}

fn apply(config: &mut ClientConfig, workspace: Option<Uuid>, args: LoginArgs) -> anyhow::Result<()> {
    if let Some(base_url) = args.base_url {
        url::Url::parse(&base_url).with_context(|| format!("invalid base url `{base_url}`"))?;
        config.base_url = base_url;
    }
    if let Some(identity) = args.identity {
        config.identity_token = Some(identity);
    }
    if let Some(user) = args.user {
        config.user_id = Some(user);
    }
    if let Some(name) = args.name {
        config.display_name = Some(name);
    }

    match (workspace, args.token) {
        (Some(workspace_id), Some(token)) => {
            let Some(role) = WorkspaceRole::parse(&args.role) else {
                bail!("role must be one of: admin, editor");
            };
            config.workspaces.insert(workspace_id, WorkspaceToken { role, token });
        }
        (None, Some(_)) => bail!("--token needs --workspace <id>"),
        _ => {}
    }
    Ok(())
}

fn print_summary(
    format: OutputFormat,
    path: &std::path::Path,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    output::print_output(format, &summarize(path, config), format_human)?;
    Ok(())
}

fn summarize(path: &std::path::Path, config: &ClientConfig) -> ConfigSummary {
    ConfigSummary {
        path: path.display().to_string(),
        base_url: config.base_url.clone(),
        user_id: config.user_id.clone(),
        display_name: config.display_name.clone(),
        has_identity_token: config.identity_token.is_some(),
        workspaces: config
            .workspaces
            .iter()
            .map(|(workspace_id, token)| WorkspaceSummary {
                workspace_id: *workspace_id,
                role: token.role,
            })
            .collect(),
    }
}

fn format_human(summary: &ConfigSummary) -> String {
    let mut lines = vec![
        format!("config:   {}", summary.path),
        format!("server:   {}", summary.base_url),
        format!("user:     {}", summary.user_id.as_deref().unwrap_or("(unset)")),
        format!("identity: {}", if summary.has_identity_token { "stored" } else { "missing" }),
    ];
    if summary.workspaces.is_empty() {
        lines.push("No workspace tokens.".into());
    }
    for workspace in &summary.workspaces {
        lines.push(format!("  {}  {}", workspace.workspace_id, workspace.role));
    }
    lines.join("\n")
}
