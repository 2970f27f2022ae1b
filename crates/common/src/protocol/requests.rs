// Request and payload shapes for each remote procedure.
//
// Request fields stay optional so the server can report missing fields with
// a uniform INVALID_INPUT error instead of a deserialization failure. The
// client leaves `workspace_token` unset; the transport injects it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Comment, Text};

/// Body of procedures that only need the workspace credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkspaceScopedRequest {
    #[serde(rename = "workspaceToken", default, skip_serializing_if = "Option::is_none")]
    pub workspace_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateTextRequest {
    #[serde(rename = "workspaceToken", default, skip_serializing_if = "Option::is_none")]
    pub workspace_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateTextRequest {
    #[serde(rename = "workspaceToken", default, skip_serializing_if = "Option::is_none")]
    pub workspace_token: Option<String>,
    #[serde(rename = "textId", default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Immutable; accepted only so a mismatching value can be rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Uuid>,
    /// Immutable; accepted only so a mismatching value can be rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteTextRequest {
    #[serde(rename = "workspaceToken", default, skip_serializing_if = "Option::is_none")]
    pub workspace_token: Option<String>,
    #[serde(rename = "textId", default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCommentRequest {
    #[serde(rename = "workspaceToken", default, skip_serializing_if = "Option::is_none")]
    pub workspace_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetCommentsRequest {
    #[serde(rename = "workspaceToken", default, skip_serializing_if = "Option::is_none")]
    pub workspace_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateCommentRequest {
    #[serde(rename = "workspaceToken", default, skip_serializing_if = "Option::is_none")]
    pub workspace_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Immutable; accepted only so a mismatching value can be rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<Uuid>,
    /// Immutable; accepted only so a mismatching value can be rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_id: Option<Uuid>,
    /// Immutable; accepted only so a mismatching value can be rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteCommentRequest {
    #[serde(rename = "workspaceToken", default, skip_serializing_if = "Option::is_none")]
    pub workspace_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<Uuid>,
}

// ── Success payloads ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextPayload {
    pub text: Text,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextsPayload {
    pub texts: Vec<Text>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CountPayload {
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentPayload {
    pub comment: Comment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentsPayload {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletedPayload {
    pub deleted: bool,
}
