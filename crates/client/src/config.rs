// Client configuration file: `~/.folio/client.toml`.
//
// Holds the server URL, the caller's identity token and the workspace
// tokens collected from previous calls. Tokens rotate on every successful
// call, so the CLI writes this file back after each command.

use std::path::{Path, PathBuf};

use folio_common::roles::WorkspaceTokenMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Root directory for client state: `~/.folio/`.
pub fn client_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".folio"))
}

/// Path to the client config file: `~/.folio/client.toml`.
pub fn client_config_path() -> Option<PathBuf> {
    client_dir().map(|dir| dir.join("client.toml"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Server root, e.g. `https://folio.example.com`.
    pub base_url: String,
    /// Bearer token proving the caller's identity.
    pub identity_token: Option<String>,
    pub user_id: Option<String>,
    /// Shown as the author of optimistic comments until the server answers.
    pub display_name: Option<String>,
    /// Workspace credentials keyed by workspace id.
    pub workspaces: WorkspaceTokenMap,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            identity_token: None,
            user_id: None,
            display_name: None,
            workspaces: WorkspaceTokenMap::new(),
        }
    }
}

impl ClientConfig {
    /// Load from `path`. A missing file yields the defaults; a malformed one is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(toml::from_str(&contents)?),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(error.into()),
        }
    }

    /// Save to `path`, creating parent directories. Owner-only on unix.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
            restrict_permissions(parent, 0o700)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        restrict_permissions(path, 0o600)
    }
}

/// Resolve an explicit `--config` path or fall back to `~/.folio/client.toml`.
pub fn resolve_path(explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    explicit.or_else(client_config_path).ok_or(ConfigError::NoHomeDir)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;

    let current = std::fs::metadata(path)?.permissions().mode() & 0o777;
    if current != mode {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<(), ConfigError> {
    Ok(())
}
