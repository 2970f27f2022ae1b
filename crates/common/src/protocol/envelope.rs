// Uniform response envelope shared by every remote procedure.
//
// Success: `{ "success": true, ...payload, "workspace_tokens": {...} }`
// Failure: `{ "success": false, "error": { code, message, details? } }`

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::roles::WorkspaceTokenMap;

pub mod codes {
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const WORKSPACE_UNAUTHORIZED: &str = "WORKSPACE_UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const UPDATE_FAILED: &str = "UPDATE_FAILED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuccessEnvelope<T> {
    pub success: bool,
    #[serde(flatten)]
    pub payload: T,
    #[serde(default)]
    pub workspace_tokens: WorkspaceTokenMap,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(payload: T, workspace_tokens: WorkspaceTokenMap) -> Self {
        Self { success: true, payload, workspace_tokens }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error: ErrorBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_tokens: Option<WorkspaceTokenMap>,
}

impl ErrorEnvelope {
    pub fn new(error: ErrorBody) -> Self {
        Self { success: false, error, workspace_tokens: None }
    }
}

/// A decoded envelope of either shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success(SuccessEnvelope<T>),
    Failure(ErrorEnvelope),
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode a raw JSON body, dispatching on the `success` flag.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let success = value.get("success").and_then(Value::as_bool).unwrap_or(false);
        if success {
            serde_json::from_value(value).map(Self::Success)
        } else {
            serde_json::from_value(value).map(Self::Failure)
        }
    }
}
