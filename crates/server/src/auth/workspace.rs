// Workspace-scoped credentials.
//
// A workspace token binds (user, workspace, role). Every successful
// verification issues a fresh token for the same triple, which the caller
// stores in place of the one it presented.

use folio_common::roles::{WorkspaceRole, WorkspaceToken, WorkspaceTokenMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::jwt::{current_unix_timestamp, TokenError, TokenSigner};

pub const WORKSPACE_TOKEN_TTL_SECONDS: i64 = 12 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceClaims {
    sub: String,
    workspace_id: Uuid,
    role: WorkspaceRole,
    iat: i64,
    exp: i64,
}

/// Outcome of a successful workspace authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceGrant {
    pub workspace_id: Uuid,
    pub role: WorkspaceRole,
    /// Rotated credentials to hand back to the caller.
    pub workspace_tokens: WorkspaceTokenMap,
}

#[derive(Debug, Error)]
pub enum AuthorizationError {
    #[error("workspace token is malformed, expired, or has a bad signature")]
    InvalidToken(#[source] TokenError),
    #[error("workspace token was issued to another user")]
    SubjectMismatch,
    #[error("role {actual} does not satisfy required role {required}")]
    InsufficientRole { actual: WorkspaceRole, required: WorkspaceRole },
    #[error("failed to issue rotated workspace token")]
    Rotation(#[source] TokenError),
}

#[derive(Clone)]
pub struct WorkspaceTokenService {
    signer: TokenSigner,
    ttl_seconds: i64,
}

impl WorkspaceTokenService {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        Ok(Self { signer: TokenSigner::new(secret)?, ttl_seconds: WORKSPACE_TOKEN_TTL_SECONDS })
    }

    pub fn with_ttl(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    pub fn issue_workspace_token(
        &self,
        user_id: &str,
        workspace_id: Uuid,
        role: WorkspaceRole,
    ) -> Result<String, TokenError> {
        self.issue_workspace_token_at(user_id, workspace_id, role, current_unix_timestamp()?)
    }

    fn issue_workspace_token_at(
        &self,
        user_id: &str,
        workspace_id: Uuid,
        role: WorkspaceRole,
        issued_at: i64,
    ) -> Result<String, TokenError> {
        let claims = WorkspaceClaims {
            sub: user_id.to_owned(),
            workspace_id,
            role,
            iat: issued_at,
            exp: issued_at + self.ttl_seconds,
        };
        self.signer.sign(&claims)
    }

    /// Verify `token` for `user_id` and require at least `minimum_role`.
    pub fn verify_workspace_token(
        &self,
        token: &str,
        user_id: &str,
        minimum_role: WorkspaceRole,
    ) -> Result<WorkspaceGrant, AuthorizationError> {
        let claims: WorkspaceClaims =
            self.signer.verify(token).map_err(AuthorizationError::InvalidToken)?;

        if claims.sub != user_id {
            return Err(AuthorizationError::SubjectMismatch);
        }
        if !claims.role.allows(minimum_role) {
            return Err(AuthorizationError::InsufficientRole {
                actual: claims.role,
                required: minimum_role,
            });
        }

        let rotated = self
            .issue_workspace_token(user_id, claims.workspace_id, claims.role)
            .map_err(AuthorizationError::Rotation)?;

        let mut workspace_tokens = WorkspaceTokenMap::new();
        workspace_tokens
            .insert(claims.workspace_id, WorkspaceToken { role: claims.role, token: rotated });

        Ok(WorkspaceGrant { workspace_id: claims.workspace_id, role: claims.role, workspace_tokens })
    }
}
