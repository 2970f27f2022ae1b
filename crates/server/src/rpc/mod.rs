// Named remote procedures under `POST /v1/rpc/{name}`.
//
// Each handler runs the same pipeline:
//   1. caller identity (bearer middleware, fails closed)
//   2. required request fields
//   3. workspace authorization at the procedure's minimum role
//   4. business validation
//   5. repository call
//   6. success envelope carrying the rotated workspace tokens

use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::Path,
    middleware,
    routing::post,
    Json, Router,
};
use folio_common::protocol::envelope::SuccessEnvelope;
use folio_common::protocol::rpc_methods::{self, minimum_role, rpc_path, RPC_PATH_PREFIX};
use folio_common::roles::WorkspaceRole;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    auth::{
        jwt::IdentityTokenService,
        middleware::{require_caller, AuthenticatedCaller},
        workspace::{AuthorizationError, WorkspaceGrant, WorkspaceTokenService},
    },
    config::ServerConfig,
    error::{ApiError, ErrorCode},
    repository::{Repositories, RepositoryError},
    validation::ValidationReport,
};

pub mod comments;
pub mod texts;

pub(crate) type RpcResult<T> = Result<Json<SuccessEnvelope<T>>, ApiError>;

// ── State ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub repositories: Repositories,
    pub identity: Arc<IdentityTokenService>,
    pub workspace_tokens: Arc<WorkspaceTokenService>,
}

impl AppState {
    pub fn new(
        repositories: Repositories,
        identity: IdentityTokenService,
        workspace_tokens: WorkspaceTokenService,
    ) -> Self {
        Self {
            repositories,
            identity: Arc::new(identity),
            workspace_tokens: Arc::new(workspace_tokens),
        }
    }

    pub fn from_config(config: &ServerConfig, repositories: Repositories) -> anyhow::Result<Self> {
        let identity = IdentityTokenService::new(&config.auth_secret)
            .context("invalid FOLIO_AUTH_SECRET")?;
        let workspace_tokens = WorkspaceTokenService::new(&config.workspace_secret)
            .context("invalid FOLIO_WORKSPACE_SECRET")?;
        Ok(Self::new(repositories, identity, workspace_tokens))
    }
}

// ── Router ─────────────────────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let identity = Arc::clone(&state.identity);

    Router::new()
        .route(&rpc_path(rpc_methods::CREATE_TEXT), post(texts::create_text))
        .route(&rpc_path(rpc_methods::GET_TEXTS), post(texts::get_texts))
        .route(&rpc_path(rpc_methods::COUNT_TEXTS), post(texts::count_texts))
        .route(&rpc_path(rpc_methods::UPDATE_TEXT), post(texts::update_text))
        .route(&rpc_path(rpc_methods::DELETE_TEXT), post(texts::delete_text))
        .route(&rpc_path(rpc_methods::CREATE_COMMENT), post(comments::create_comment))
        .route(&rpc_path(rpc_methods::GET_COMMENTS), post(comments::get_comments))
        .route(&rpc_path(rpc_methods::UPDATE_COMMENT), post(comments::update_comment))
        .route(&rpc_path(rpc_methods::DELETE_COMMENT), post(comments::delete_comment))
        .route(&format!("{RPC_PATH_PREFIX}/{{method}}"), post(unknown_method))
        .layer(middleware::from_fn_with_state(identity, require_caller))
        .with_state(state)
}

async fn unknown_method(Path(method): Path<String>) -> ApiError {
    ApiError::not_found(format!("unknown procedure '{method}'"))
}

// ── Pipeline helpers ───────────────────────────────────────────────

pub(crate) fn require<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::missing_field(field))
}

pub(crate) fn require_workspace_token(value: Option<String>) -> Result<String, ApiError> {
    value.filter(|token| !token.trim().is_empty()).ok_or_else(|| ApiError::missing_field("workspaceToken"))
}

/// An authorized call in flight.
pub(crate) struct RpcCall {
    method: &'static str,
    caller: AuthenticatedCaller,
    grant: WorkspaceGrant,
}

impl RpcCall {
    pub(crate) fn authorize(
        state: &AppState,
        method: &'static str,
        caller: AuthenticatedCaller,
        workspace_token: &str,
    ) -> Result<Self, ApiError> {
        let required = minimum_role(method).unwrap_or(WorkspaceRole::Admin);

        match state.workspace_tokens.verify_workspace_token(workspace_token, &caller.user_id, required)
        {
            Ok(grant) => Ok(Self { method, caller, grant }),
            Err(AuthorizationError::Rotation(source)) => {
                error!(
                    user_id = %caller.user_id,
                    method,
                    error = ?source,
                    "failed to rotate workspace token"
                );
                Err(ApiError::internal())
            }
            Err(error) => {
                warn!(
                    user_id = %caller.user_id,
                    method,
                    required_role = %required,
                    error = %error,
                    "workspace authorization failed"
                );
                Err(ApiError::from_code(ErrorCode::WorkspaceUnauthorized))
            }
        }
    }

    pub(crate) fn workspace_id(&self) -> Uuid {
        self.grant.workspace_id
    }

    pub(crate) fn user_id(&self) -> &str {
        &self.caller.user_id
    }

    pub(crate) fn caller(&self) -> &AuthenticatedCaller {
        &self.caller
    }

    /// Attach the rotated credentials to a failure raised after authorization.
    pub(crate) fn fail(&self, error: ApiError) -> ApiError {
        error.with_workspace_tokens(self.grant.workspace_tokens.clone())
    }

    pub(crate) fn not_found(&self, what: &str) -> ApiError {
        self.fail(ApiError::not_found(format!("{what} not found")))
    }

    pub(crate) fn update_failed(&self, what: &str) -> ApiError {
        self.fail(ApiError::new(ErrorCode::UpdateFailed, format!("{what} update failed")))
    }

    pub(crate) fn storage_error(&self, error: RepositoryError) -> ApiError {
        error!(
            user_id = %self.caller.user_id,
            workspace_id = %self.grant.workspace_id,
            method = self.method,
            error = ?error,
            "repository call failed"
        );
        self.fail(ApiError::internal())
    }

    /// Gate on a validation report; warnings are logged and never block.
    pub(crate) fn check(&self, report: ValidationReport) -> Result<(), ApiError> {
        if !report.errors.is_empty() {
            debug!(method = self.method, errors = ?report.errors, "payload failed validation");
        }
        match report.into_result() {
            Ok(warnings) => {
                if !warnings.is_empty() {
                    debug!(method = self.method, ?warnings, "payload accepted with warnings");
                }
                Ok(())
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    pub(crate) fn respond<T>(self, payload: T) -> Json<SuccessEnvelope<T>> {
        Json(SuccessEnvelope::new(payload, self.grant.workspace_tokens))
    }
}


#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use folio_common::roles::WorkspaceRole;
    use serde_json::json;

    use super::test_support::{Harness, USER, W1};

    #[tokio::test]
    async fn missing_bearer_is_unauthenticated() {
        let harness = Harness::empty();
        let token = harness.workspace_token(USER, W1, WorkspaceRole::Admin);

        let (status, body) =
            harness.call(None, "getTexts", json!({ "workspaceToken": token })).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn missing_workspace_token_is_invalid_input() {
        let harness = Harness::empty();
        let bearer = harness.bearer(USER);

        let (status, body) = harness.call(Some(&bearer), "getTexts", json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert_eq!(body["error"]["message"], "workspaceToken is required");
    }

    #[tokio::test]
    async fn workspace_token_of_another_user_is_rejected() {
        let harness = Harness::empty();
        let bearer = harness.bearer("user-2");
        let token = harness.workspace_token(USER, W1, WorkspaceRole::Admin);

        let (status, body) =
            harness.call(Some(&bearer), "getTexts", json!({ "workspaceToken": token })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "WORKSPACE_UNAUTHORIZED");
        assert!(body.get("workspace_tokens").is_none());
    }

    #[tokio::test]
    async fn garbage_workspace_token_is_rejected() {
        let harness = Harness::empty();
        let bearer = harness.bearer(USER);

        let (status, body) =
            harness.call(Some(&bearer), "getTexts", json!({ "workspaceToken": "nope" })).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "WORKSPACE_UNAUTHORIZED");
    }

    #[tokio::test]
    async fn unknown_procedure_is_not_found() {
        let harness = Harness::empty();
        let (status, body) =
            harness.call_as(WorkspaceRole::Admin, W1, "launchRockets", json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_input() {
        let harness = Harness::empty();
        let bearer = harness.bearer(USER);

        let (status, body) = harness
            .call(Some(&bearer), "updateText", json!({ "workspaceToken": "x", "textId": "not-a-uuid" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert_eq!(body["error"]["details"]["kind"], "data_error");
    }

    #[tokio::test]
    async fn success_envelope_rotates_workspace_token() {
        let harness = Harness::empty();
        let (status, body) = harness.call_as(WorkspaceRole::Editor, W1, "getTexts", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let rotated = &body["workspace_tokens"][W1.to_string()];
        assert_eq!(rotated["role"], "editor");
        let token = rotated["token"].as_str().expect("rotated token should be a string").to_owned();

        let bearer = harness.bearer(USER);
        let (status, _) =
            harness.call(Some(&bearer), "getTexts", json!({ "workspaceToken": token })).await;
        assert_eq!(status, StatusCode::OK);
    }
}
