// Text procedures: createText, getTexts, countTexts, updateText, deleteText.

use axum::extract::{Extension, State};
use chrono::Utc;
use folio_common::protocol::requests::{
    CountPayload, CreateTextRequest, DeleteTextRequest, DeletedPayload, TextPayload,
    TextsPayload, UpdateTextRequest, WorkspaceScopedRequest,
};
use folio_common::protocol::rpc_methods::{
    COUNT_TEXTS, CREATE_TEXT, DELETE_TEXT, GET_TEXTS, UPDATE_TEXT,
};
use folio_common::types::PublicationStatus;
use tracing::{info, warn};

use super::{require, require_workspace_token, AppState, RpcCall, RpcResult};
use crate::{
    auth::middleware::AuthenticatedCaller,
    repository::{NewText, TextPatch},
    validation::{
        validate_text_data, validate_text_deletion, validate_text_update, TextChanges, TextDraft,
        ValidatedJson,
    },
};

pub(crate) async fn create_text(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<CreateTextRequest>,
) -> RpcResult<TextPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let content = require(request.content, "content")?.trim().to_owned();
    let title = request.title.map(|title| title.trim().to_owned()).filter(|title| !title.is_empty());
    let call = RpcCall::authorize(&state, CREATE_TEXT, caller, &workspace_token)?;

    call.check(validate_text_data(&TextDraft {
        title: title.as_deref(),
        content: Some(&content),
        status: request.status.as_deref(),
    }))?;

    let status =
        request.status.as_deref().and_then(PublicationStatus::parse).unwrap_or_default();
    let text = state
        .repositories
        .texts
        .create(
            call.workspace_id(),
            NewText {
                title,
                content,
                status,
                created_by: call.user_id().to_owned(),
            },
        )
        .await
        .map_err(|error| call.storage_error(error))?;

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "create_text",
        text_id = %text.id,
        "text created"
    );

    Ok(call.respond(TextPayload { text }))
}

pub(crate) async fn get_texts(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<WorkspaceScopedRequest>,
) -> RpcResult<TextsPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let call = RpcCall::authorize(&state, GET_TEXTS, caller, &workspace_token)?;

    let texts = state
        .repositories
        .texts
        .get_by_workspace(call.workspace_id())
        .await
        .map_err(|error| call.storage_error(error))?;

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "get_texts",
        count = texts.len(),
        "texts listed"
    );

    Ok(call.respond(TextsPayload { texts }))
}

pub(crate) async fn count_texts(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<WorkspaceScopedRequest>,
) -> RpcResult<CountPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let call = RpcCall::authorize(&state, COUNT_TEXTS, caller, &workspace_token)?;

    let count = state
        .repositories
        .texts
        .count(call.workspace_id())
        .await
        .map_err(|error| call.storage_error(error))?;

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "count_texts",
        count,
        "texts counted"
    );

    Ok(call.respond(CountPayload { count }))
}

pub(crate) async fn update_text(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<UpdateTextRequest>,
) -> RpcResult<TextPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let text_id = require(request.text_id, "textId")?;
    let call = RpcCall::authorize(&state, UPDATE_TEXT, caller, &workspace_token)?;
    let texts = &state.repositories.texts;

    let existing = texts
        .get_by_id(text_id, call.workspace_id())
        .await
        .map_err(|error| call.storage_error(error))?
        .ok_or_else(|| call.not_found("text"))?;

    call.check(validate_text_update(
        &existing,
        &TextChanges {
            title: request.title.as_deref(),
            content: request.content.as_deref(),
            status: request.status.as_deref(),
            workspace_id: request.workspace_id,
            created_by: request.created_by.as_deref(),
        },
    ))?;

    let patch = TextPatch {
        title: request.title,
        content: request.content,
        status: request.status.as_deref().and_then(PublicationStatus::parse),
    };
    let text = texts
        .update(text_id, call.workspace_id(), patch)
        .await
        .map_err(|error| call.storage_error(error))?
        .ok_or_else(|| call.update_failed("text"))?;

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "update_text",
        text_id = %text.id,
        "text updated"
    );

    Ok(call.respond(TextPayload { text }))
}

pub(crate) async fn delete_text(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<DeleteTextRequest>,
) -> RpcResult<DeletedPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let text_id = require(request.text_id, "textId")?;
    let call = RpcCall::authorize(&state, DELETE_TEXT, caller, &workspace_token)?;
    let texts = &state.repositories.texts;

    let existing = texts
        .get_by_id(text_id, call.workspace_id())
        .await
        .map_err(|error| call.storage_error(error))?
        .ok_or_else(|| call.not_found("text"))?;

    let advisory = validate_text_deletion(&existing, Utc::now());
    if !advisory.warnings.is_empty() {
        warn!(
            workspace_id = %call.workspace_id(),
            user_id = %call.user_id(),
            text_id = %text_id,
            warnings = ?advisory.warnings,
            "deleting text despite warnings"
        );
    }

    let deleted = texts
        .delete(text_id, call.workspace_id())
        .await
        .map_err(|error| call.storage_error(error))?;
    if !deleted {
        return Err(call.not_found("text"));
    }

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "delete_text",
        text_id = %text_id,
        "text deleted"
    );

    Ok(call.respond(DeletedPayload { deleted }))
}
