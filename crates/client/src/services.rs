// Typed wrappers over the remote procedures.

use std::sync::Arc;

use folio_common::protocol::requests::{
    CommentPayload, CommentsPayload, CountPayload, CreateCommentRequest, CreateTextRequest,
    DeleteCommentRequest, DeleteTextRequest, DeletedPayload, GetCommentsRequest,
    TextPayload, TextsPayload, UpdateCommentRequest, UpdateTextRequest, WorkspaceScopedRequest,
};
use folio_common::protocol::rpc_methods::{
    COUNT_TEXTS, CREATE_COMMENT, CREATE_TEXT, DELETE_COMMENT, DELETE_TEXT, GET_COMMENTS,
    GET_TEXTS, UPDATE_COMMENT, UPDATE_TEXT,
};
use folio_common::types::{Comment, Text};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::transport::{ClientError, RpcTransport};

/// Fields a caller may set when creating or editing a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
}

/// Fields a caller may set when creating or editing a comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentInput {
    pub content: Option<String>,
    pub status: Option<String>,
    pub parent_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct FolioApi {
    transport: Arc<dyn RpcTransport>,
}

impl FolioApi {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    async fn invoke<B, P>(&self, method: &str, workspace_id: Uuid, body: &B) -> Result<P, ClientError>
    where
        B: Serialize,
        P: DeserializeOwned,
    {
        let body = serde_json::to_value(body)
            .map_err(|error| ClientError::InvalidResponse(format!("unserializable request: {error}")))?;
        let payload = self.transport.call(method, workspace_id, body).await?;
        serde_json::from_value(payload).map_err(|error| {
            ClientError::InvalidResponse(format!("{method} returned an unexpected payload: {error}"))
        })
    }

    // ── Texts ──────────────────────────────────────────────────────

    pub async fn get_texts(&self, workspace_id: Uuid) -> Result<Vec<Text>, ClientError> {
        let payload: TextsPayload =
            self.invoke(GET_TEXTS, workspace_id, &WorkspaceScopedRequest::default()).await?;
        Ok(payload.texts)
    }

    pub async fn count_texts(&self, workspace_id: Uuid) -> Result<i64, ClientError> {
        let payload: CountPayload =
            self.invoke(COUNT_TEXTS, workspace_id, &WorkspaceScopedRequest::default()).await?;
        Ok(payload.count)
    }

    pub async fn create_text(&self, workspace_id: Uuid, input: TextInput) -> Result<Text, ClientError> {
        let request = CreateTextRequest {
            workspace_token: None,
            title: input.title,
            content: input.content,
            status: input.status,
        };
        let payload: TextPayload = self.invoke(CREATE_TEXT, workspace_id, &request).await?;
        Ok(payload.text)
    }

    pub async fn update_text(
        &self,
        workspace_id: Uuid,
        text_id: Uuid,
        input: TextInput,
    ) -> Result<Text, ClientError> {
        let request = UpdateTextRequest {
            text_id: Some(text_id),
            title: input.title,
            content: input.content,
            status: input.status,
            ..UpdateTextRequest::default()
        };
        let payload: TextPayload = self.invoke(UPDATE_TEXT, workspace_id, &request).await?;
        Ok(payload.text)
    }

    pub async fn delete_text(&self, workspace_id: Uuid, text_id: Uuid) -> Result<bool, ClientError> {
        let request = DeleteTextRequest { workspace_token: None, text_id: Some(text_id) };
        let payload: DeletedPayload = self.invoke(DELETE_TEXT, workspace_id, &request).await?;
        Ok(payload.deleted)
    }

    // ── Comments ───────────────────────────────────────────────────

    pub async fn get_comments(
        &self,
        workspace_id: Uuid,
        text_id: Uuid,
    ) -> Result<Vec<Comment>, ClientError> {
        let request = GetCommentsRequest { workspace_token: None, text_id: Some(text_id) };
        let payload: CommentsPayload = self.invoke(GET_COMMENTS, workspace_id, &request).await?;
        Ok(payload.comments)
    }

    pub async fn create_comment(
        &self,
        workspace_id: Uuid,
        text_id: Uuid,
        input: CommentInput,
    ) -> Result<Comment, ClientError> {
        let request = CreateCommentRequest {
            workspace_token: None,
            text_id: Some(text_id),
            content: input.content,
            status: input.status,
            parent_id: input.parent_id.map(|id| id.to_string()),
        };
        let payload: CommentPayload = self.invoke(CREATE_COMMENT, workspace_id, &request).await?;
        Ok(payload.comment)
    }

    pub async fn update_comment(
        &self,
        workspace_id: Uuid,
        comment_id: Uuid,
        input: CommentInput,
    ) -> Result<Comment, ClientError> {
        let request = UpdateCommentRequest {
            comment_id: Some(comment_id),
            content: input.content,
            status: input.status,
            ..UpdateCommentRequest::default()
        };
        let payload: CommentPayload = self.invoke(UPDATE_COMMENT, workspace_id, &request).await?;
        Ok(payload.comment)
    }

    pub async fn delete_comment(
        &self,
        workspace_id: Uuid,
        comment_id: Uuid,
    ) -> Result<bool, ClientError> {
        let request = DeleteCommentRequest { workspace_token: None, comment_id: Some(comment_id) };
        let payload: DeletedPayload = self.invoke(DELETE_COMMENT, workspace_id, &request).await?;
        Ok(payload.deleted)
    }
}
