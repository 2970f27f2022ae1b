// Rotating workspace credentials held by a running client.

use folio_common::roles::{WorkspaceRole, WorkspaceToken, WorkspaceTokenMap};
use tokio::sync::RwLock;
use uuid::Uuid;

/// The client's current `WorkspaceTokenMap`.
///
/// Every successful envelope carries refreshed tokens; [`TokenStore::absorb`]
/// merges them so the next call uses the newest credential.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: RwLock<WorkspaceTokenMap>,
}

impl TokenStore {
    pub fn new(tokens: WorkspaceTokenMap) -> Self {
        Self { tokens: RwLock::new(tokens) }
    }

    pub async fn token_for(&self, workspace_id: Uuid) -> Option<String> {
        self.tokens.read().await.get(&workspace_id).map(|entry| entry.token.clone())
    }

    pub async fn role_for(&self, workspace_id: Uuid) -> Option<WorkspaceRole> {
        self.tokens.read().await.get(&workspace_id).map(|entry| entry.role)
    }

    pub async fn insert(&self, workspace_id: Uuid, token: WorkspaceToken) {
        self.tokens.write().await.insert(workspace_id, token);
    }

    /// Merge refreshed tokens; entries for other workspaces are kept.
    pub async fn absorb(&self, refreshed: WorkspaceTokenMap) {
        if refreshed.is_empty() {
            return;
        }
        self.tokens.write().await.extend(refreshed);
    }

    pub async fn snapshot(&self) -> WorkspaceTokenMap {
        self.tokens.read().await.clone()
    }
}
