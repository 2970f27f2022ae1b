// Comment procedures: createComment, getComments, updateComment, deleteComment.

use axum::extract::{Extension, State};
use folio_common::protocol::requests::{
    CommentPayload, CommentsPayload, CreateCommentRequest, DeleteCommentRequest,
    DeletedPayload, GetCommentsRequest, UpdateCommentRequest,
};
use folio_common::protocol::rpc_methods::{
    CREATE_COMMENT, DELETE_COMMENT, GET_COMMENTS, UPDATE_COMMENT,
};
use folio_common::types::PublicationStatus;
use tracing::info;
use uuid::Uuid;

use super::{require, require_workspace_token, AppState, RpcCall, RpcResult};
use crate::{
    auth::middleware::AuthenticatedCaller,
    error::ApiError,
    repository::{CommentPatch, NewComment},
    validation::{
        validate_comment_data, validate_comment_update, CommentChanges, CommentDraft,
        ValidatedJson,
    },
};

/// Shown when the identity token carries no display name.
pub const FALLBACK_AUTHOR_NAME: &str = "Anonymous";

pub(crate) async fn create_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> RpcResult<CommentPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let text_id = require(request.text_id, "text_id")?;
    let content = require(request.content, "content")?.trim().to_owned();
    let call = RpcCall::authorize(&state, CREATE_COMMENT, caller, &workspace_token)?;

    let author_name = call
        .caller()
        .display_name
        .clone()
        .unwrap_or_else(|| FALLBACK_AUTHOR_NAME.to_owned());

    call.check(validate_comment_data(&CommentDraft {
        content: Some(&content),
        text_id: Some(text_id),
        author_id: Some(call.user_id()),
        author_name: Some(&author_name),
        status: request.status.as_deref(),
        parent_id: request.parent_id.as_deref(),
    }))?;

    state
        .repositories
        .texts
        .get_by_id(text_id, call.workspace_id())
        .await
        .map_err(|error| call.storage_error(error))?
        .ok_or_else(|| call.not_found("text"))?;

    let parent_id = match request.parent_id.as_deref() {
        Some(raw) => {
            let parent_id = Uuid::parse_str(raw.trim())
                .map_err(|_| call.fail(ApiError::invalid_input("parent_id must be a valid id")))?;
            let parent = state
                .repositories
                .comments
                .get_by_id(parent_id, call.workspace_id())
                .await
                .map_err(|error| call.storage_error(error))?;
            if parent.map_or(true, |parent| parent.text_id != text_id) {
                return Err(call.fail(ApiError::invalid_input(
                    "parent_id must reference a comment on the same text",
                )));
            }
            Some(parent_id)
        }
        None => None,
    };

    let status =
        request.status.as_deref().and_then(PublicationStatus::parse).unwrap_or_default();
    let comment = state
        .repositories
        .comments
        .create(
            call.workspace_id(),
            NewComment {
                text_id,
                content,
                status,
                author_id: call.user_id().to_owned(),
                author_name,
                parent_id,
            },
        )
        .await
        .map_err(|error| call.storage_error(error))?;

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "create_comment",
        comment_id = %comment.id,
        text_id = %text_id,
        "comment created"
    );

    Ok(call.respond(CommentPayload { comment }))
}

pub(crate) async fn get_comments(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<GetCommentsRequest>,
) -> RpcResult<CommentsPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let text_id = require(request.text_id, "text_id")?;
    let call = RpcCall::authorize(&state, GET_COMMENTS, caller, &workspace_token)?;

    let comments = state
        .repositories
        .comments
        .get_by_text(call.workspace_id(), text_id)
        .await
        .map_err(|error| call.storage_error(error))?;

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "get_comments",
        text_id = %text_id,
        count = comments.len(),
        "comments listed"
    );

    Ok(call.respond(CommentsPayload { comments }))
}

pub(crate) async fn update_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<UpdateCommentRequest>,
) -> RpcResult<CommentPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let comment_id = require(request.comment_id, "comment_id")?;
    let call = RpcCall::authorize(&state, UPDATE_COMMENT, caller, &workspace_token)?;
    let comments = &state.repositories.comments;

    let existing = comments
        .get_by_id(comment_id, call.workspace_id())
        .await
        .map_err(|error| call.storage_error(error))?
        .ok_or_else(|| call.not_found("comment"))?;

    call.check(validate_comment_update(
        &existing,
        &CommentChanges {
            content: request.content.as_deref(),
            status: request.status.as_deref(),
            workspace_id: request.workspace_id,
            text_id: request.text_id,
            author_id: request.author_id.as_deref(),
        },
    ))?;

    let patch = CommentPatch {
        content: request.content,
        status: request.status.as_deref().and_then(PublicationStatus::parse),
    };
    let comment = comments
        .update(comment_id, call.workspace_id(), patch)
        .await
        .map_err(|error| call.storage_error(error))?
        .ok_or_else(|| call.update_failed("comment"))?;

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "update_comment",
        comment_id = %comment.id,
        "comment updated"
    );

    Ok(call.respond(CommentPayload { comment }))
}

pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedCaller>,
    ValidatedJson(request): ValidatedJson<DeleteCommentRequest>,
) -> RpcResult<DeletedPayload> {
    let workspace_token = require_workspace_token(request.workspace_token)?;
    let comment_id = require(request.comment_id, "comment_id")?;
    let call = RpcCall::authorize(&state, DELETE_COMMENT, caller, &workspace_token)?;

    let deleted = state
        .repositories
        .comments
        .delete(comment_id, call.workspace_id())
        .await
        .map_err(|error| call.storage_error(error))?;
    if !deleted {
        return Err(call.not_found("comment"));
    }

    info!(
        workspace_id = %call.workspace_id(),
        user_id = %call.user_id(),
        action = "delete_comment",
        comment_id = %comment_id,
        "comment deleted"
    );

    Ok(call.respond(DeletedPayload { deleted }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::http::StatusCode;
    use folio_common::roles::WorkspaceRole;
    use serde_json::{json, Value};

    use crate::repository::{MemoryTextRepository, Repositories};
    use crate::rpc::test_support::{CountingComments, Harness, W1, W2};

    async fn create_text(harness: &Harness) -> Value {
        let (status, body) = harness
            .call_as(
                WorkspaceRole::Editor,
                W1,
                "createText",
                json!({ "title": "Demo", "content": "Hello world" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["text"]["id"].clone()
    }

    async fn create_comment(harness: &Harness, body: Value) -> (StatusCode, Value) {
        harness.call_as(WorkspaceRole::Editor, W1, "createComment", body).await
    }

    #[tokio::test]
    async fn too_short_comment_is_rejected_before_any_repository_call() {
        let comments = CountingComments::default();
        let calls = Arc::clone(&comments.calls);
        let repositories =
            Repositories::in_process(Arc::new(MemoryTextRepository::new()), Arc::new(comments));
        let harness = Harness::new(repositories);

        let (status, body) = create_comment(
            &harness,
            json!({ "text_id": "00000000-0000-0000-0000-000000000001", "content": "ok" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");
        assert!(body["error"]["message"]
            .as_str()
            .expect("message should be a string")
            .contains("at least 3 characters"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn comment_takes_author_from_identity() {
        let harness = Harness::empty();
        let text_id = create_text(&harness).await;

        let (status, body) =
            create_comment(&harness, json!({ "text_id": text_id, "content": "Great read, thanks" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comment"]["author_id"], "user-1");
        assert_eq!(body["comment"]["author_name"], "Ada");
        assert_eq!(body["comment"]["status"], "draft");
        assert!(body["comment"].get("parent_id").is_none());
    }

    #[tokio::test]
    async fn comment_content_is_trimmed_before_validation_and_storage() {
        let harness = Harness::empty();
        let text_id = create_text(&harness).await;

        let padded = format!("{}{}", "a".repeat(1995), " ".repeat(20));
        let (status, body) =
            create_comment(&harness, json!({ "text_id": text_id, "content": padded })).await;
        assert_eq!(status, StatusCode::OK, "body: {body}");
        assert_eq!(body["comment"]["content"], "a".repeat(1995));

        let (status, body) =
            create_comment(&harness, json!({ "text_id": text_id, "content": "  Nice text  " })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comment"]["content"], "Nice text");

        let (_, listed) =
            harness.call_as(WorkspaceRole::Editor, W1, "getComments", json!({ "text_id": text_id })).await;
        let contents: Vec<&Value> =
            listed["comments"].as_array().expect("comments array").iter().map(|c| &c["content"]).collect();
        assert_eq!(contents, vec![&json!("a".repeat(1995)), &json!("Nice text")]);
    }

    #[tokio::test]
    async fn comment_on_unknown_text_is_not_found() {
        let harness = Harness::empty();
        let (status, body) = create_comment(
            &harness,
            json!({ "text_id": "00000000-0000-0000-0000-000000000009", "content": "Hello there" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "text not found");
    }

    #[tokio::test]
    async fn replies_must_target_a_comment_on_the_same_text() {
        let harness = Harness::empty();
        let text_id = create_text(&harness).await;
        let (_, parent) =
            create_comment(&harness, json!({ "text_id": text_id, "content": "Top-level remark" })).await;
        let parent_id = parent["comment"]["id"].clone();

        let (status, reply) = create_comment(
            &harness,
            json!({ "text_id": text_id, "content": "A reply to you", "parent_id": parent_id }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["comment"]["parent_id"], parent_id);

        let other_text = create_text(&harness).await;
        let (status, body) = create_comment(
            &harness,
            json!({ "text_id": other_text, "content": "Misplaced reply", "parent_id": parent_id }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "parent_id must reference a comment on the same text");

        let (status, body) = create_comment(
            &harness,
            json!({ "text_id": text_id, "content": "Broken reply", "parent_id": "not-an-id" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "parent_id must be a valid id");
    }

    #[tokio::test]
    async fn comments_list_oldest_first_and_stay_in_workspace() {
        let harness = Harness::empty();
        let text_id = create_text(&harness).await;
        for content in ["First comment", "Second comment"] {
            let (status, _) =
                create_comment(&harness, json!({ "text_id": text_id, "content": content })).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (_, body) = harness
            .call_as(WorkspaceRole::Editor, W1, "getComments", json!({ "text_id": text_id }))
            .await;
        let contents: Vec<&str> = body["comments"]
            .as_array()
            .expect("comments array")
            .iter()
            .map(|c| c["content"].as_str().expect("content"))
            .collect();
        assert_eq!(contents, vec!["First comment", "Second comment"]);

        let (_, other) = harness
            .call_as(WorkspaceRole::Editor, W2, "getComments", json!({ "text_id": text_id }))
            .await;
        assert_eq!(other["comments"], json!([]));
    }

    #[tokio::test]
    async fn update_comment_validates_and_applies() {
        let harness = Harness::empty();
        let text_id = create_text(&harness).await;
        let (_, created) =
            create_comment(&harness, json!({ "text_id": text_id, "content": "Original remark" })).await;
        let comment_id = created["comment"]["id"].clone();

        let (status, body) = harness
            .call_as(
                WorkspaceRole::Editor,
                W1,
                "updateComment",
                json!({ "comment_id": comment_id, "content": "no" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "content must be at least 3 characters");

        let (status, body) = harness
            .call_as(
                WorkspaceRole::Editor,
                W1,
                "updateComment",
                json!({ "comment_id": comment_id, "status": "published" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comment"]["status"], "published");
        assert_eq!(body["comment"]["content"], "Original remark");

        let (status, body) = harness
            .call_as(
                WorkspaceRole::Editor,
                W1,
                "updateComment",
                json!({ "comment_id": "00000000-0000-0000-0000-0000000000ff", "content": "Hello" }),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "comment not found");
    }

    #[tokio::test]
    async fn delete_comment_requires_admin() {
        let harness = Harness::empty();
        let text_id = create_text(&harness).await;
        let (_, created) =
            create_comment(&harness, json!({ "text_id": text_id, "content": "Short-lived" })).await;
        let comment_id = created["comment"]["id"].clone();

        let (status, _) = harness
            .call_as(WorkspaceRole::Editor, W1, "deleteComment", json!({ "comment_id": comment_id }))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = harness
            .call_as(WorkspaceRole::Admin, W1, "deleteComment", json!({ "comment_id": comment_id }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], true);

        let (status, _) = harness
            .call_as(WorkspaceRole::Admin, W1, "deleteComment", json!({ "comment_id": comment_id }))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
