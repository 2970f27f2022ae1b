// CLI subcommand dispatch and the session shared by remote commands.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Args, Subcommand};
use folio_client::config::{self, ClientConfig};
use folio_client::tokens::TokenStore;
use folio_client::{FolioApi, HttpTransport, MutationStrategy, RpcTransport};
use tracing::debug;
use uuid::Uuid;

use crate::output::OutputFormat;

pub mod comments;
pub mod login;
pub mod texts;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file (default: ~/.folio/client.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Force JSON output.
    #[arg(long, global = true)]
    pub json: bool,
    /// Workspace to operate in. Optional when exactly one workspace is configured.
    #[arg(long, short = 'w', global = true)]
    pub workspace: Option<Uuid>,
    /// Refetch after each write instead of updating the local view first.
    #[arg(long, global = true)]
    pub no_optimistic: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List, create, update or delete texts
    #[command(subcommand)]
    Texts(texts::TextsCommand),
    /// List, create, update or delete comments on a text
    #[command(subcommand)]
    Comments(comments::CommentsCommand),
    /// Store an identity token or a workspace token
    Login(login::LoginArgs),
    /// Show the active configuration
    Config,
}

pub async fn run(global: GlobalArgs, command: Command) -> anyhow::Result<()> {
    let format = OutputFormat::detect(global.json);
    match command {
        Command::Login(args) => login::run(&global, args, format),
        Command::Config => login::show(&global, format),
        Command::Texts(command) => {
            let session = Session::open(&global, format)?;
            let result = texts::run(&session, command).await;
            session.persist_tokens().await?;
            result
        }
        Command::Comments(command) => {
            let session = Session::open(&global, format)?;
            let result = comments::run(&session, command).await;
            session.persist_tokens().await?;
            result
        }
    }
}

/// Everything a remote command needs: the API, the caller and the target workspace.
pub struct Session {
    pub api: FolioApi,
    pub format: OutputFormat,
    pub workspace_id: Uuid,
    pub user_id: String,
    pub display_name: Option<String>,
    pub strategy: MutationStrategy,
    config: ClientConfig,
    config_path: PathBuf,
    tokens: Arc<TokenStore>,
}

impl Session {
    pub fn open(global: &GlobalArgs, format: OutputFormat) -> anyhow::Result<Self> {
        let config_path = config::resolve_path(global.config.clone())?;
        let config = ClientConfig::load_from(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?;

        let Some(identity_token) = config.identity_token.clone() else {
            bail!("no identity token configured. Run: folio login --identity <token>");
        };
        let workspace_id = select_workspace(global.workspace, &config)?;
        let user_id = config.user_id.clone().unwrap_or_default();

        let tokens = Arc::new(TokenStore::new(config.workspaces.clone()));
        let transport = HttpTransport::new(&config.base_url, identity_token, Arc::clone(&tokens))?;
        debug!(base_url = %config.base_url, %workspace_id, "session opened");

        Ok(Self {
            api: FolioApi::new(Arc::new(transport) as Arc<dyn RpcTransport>),
            format,
            workspace_id,
            user_id,
            display_name: config.display_name.clone(),
            strategy: if global.no_optimistic {
                MutationStrategy::Invalidate
            } else {
                MutationStrategy::Optimistic
            },
            config,
            config_path,
            tokens,
        })
    }

    /// Write rotated workspace tokens back to the config file.
    pub async fn persist_tokens(&self) -> anyhow::Result<()> {
        let refreshed = self.tokens.snapshot().await;
        if refreshed == self.config.workspaces {
            return Ok(());
        }
        let mut config = self.config.clone();
        config.workspaces = refreshed;
        config
            .save_to(&self.config_path)
            .with_context(|| format!("failed to save {}", self.config_path.display()))?;
        debug!(path = %self.config_path.display(), "workspace tokens persisted");
        Ok(())
    }
}

fn select_workspace(explicit: Option<Uuid>, config: &ClientConfig) -> anyhow::Result<Uuid> {
    if let Some(workspace_id) = explicit {
        return Ok(workspace_id);
    }
    let mut configured = config.workspaces.keys();
    match (configured.next(), configured.next()) {
        (Some(only), None) => Ok(*only),
        (None, _) => bail!(
            "no workspace configured. Run: folio login --workspace <id> --token <token>"
        ),
        (Some(_), Some(_)) => bail!("several workspaces configured; pass --workspace <id>"),
    }
}
