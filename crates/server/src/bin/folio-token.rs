// Mint identity and workspace tokens for local development and smoke tests.
//
// Secrets are read from the same environment as the server
// (`FOLIO_AUTH_SECRET`, `FOLIO_WORKSPACE_SECRET`).

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use folio_common::roles::WorkspaceRole;
use folio_server::{
    auth::{jwt::IdentityTokenService, workspace::WorkspaceTokenService},
    config::ServerConfig,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "folio-token", about = "Issue Folio bearer and workspace tokens")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Issue a caller identity (bearer) token
    Identity {
        /// User id placed in `sub`
        #[arg(long)]
        user: String,
        /// Display name used as comment author
        #[arg(long)]
        name: Option<String>,
        /// Lifetime in seconds
        #[arg(long)]
        ttl: Option<i64>,
    },
    /// Issue a workspace token for one (user, workspace, role)
    Workspace {
        #[arg(long)]
        user: String,
        #[arg(long)]
        workspace: Uuid,
        /// `admin` or `editor`
        #[arg(long, default_value = "editor")]
        role: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::from_env();

    let token = match cli.command {
        Command::Identity { user, name, ttl } => {
            let service = IdentityTokenService::new(&config.auth_secret)
                .context("invalid FOLIO_AUTH_SECRET")?;
            match ttl {
                Some(ttl) => service.issue_identity_token_with_ttl(&user, name.as_deref(), ttl),
                None => service.issue_identity_token(&user, name.as_deref()),
            }
            .context("failed to issue identity token")?
        }
        Command::Workspace { user, workspace, role } => {
            let role = WorkspaceRole::parse(&role)
                .ok_or_else(|| anyhow!("unknown role '{role}', expected admin or editor"))?;
            WorkspaceTokenService::new(&config.workspace_secret)
                .context("invalid FOLIO_WORKSPACE_SECRET")?
                .issue_workspace_token(&user, workspace, role)
                .context("failed to issue workspace token")?
        }
    };

    println!("{token}");
    Ok(())
}
