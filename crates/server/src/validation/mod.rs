// Input validation.
//
// - `ValidatedJson<T>` extractor: serde decode with uniform INVALID_INPUT errors.
// - `ValidationReport`: errors block the operation, warnings are advisory.
// - Business rules for texts and comments live in the submodules.

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use folio_common::types::PublicationStatus;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::error::ApiError;

pub mod comment;
pub mod text;

pub use comment::{
    validate_comment_data, validate_comment_update, CommentChanges, CommentDraft,
};
pub use text::{
    validate_text_data, validate_text_deletion, validate_text_length, validate_text_update,
    TextChanges, TextDraft, TextField,
};

/// Maximum request body in bytes (1 MiB).
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

// ── ValidatedJson extractor ────────────────────────────────────────

/// A JSON body extractor that returns a structured `ApiError` on failure.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidatedJson(value)),
            Err(rejection) => {
                let (message, details) = classify_json_rejection(&rejection);
                Err(ApiError::invalid_input(message).with_details(details))
            }
        }
    }
}

fn classify_json_rejection(rejection: &JsonRejection) -> (String, serde_json::Value) {
    match rejection {
        JsonRejection::JsonDataError(e) => {
            (format!("invalid JSON payload: {e}"), json!({ "kind": "data_error" }))
        }
        JsonRejection::JsonSyntaxError(e) => {
            (format!("malformed JSON: {e}"), json!({ "kind": "syntax_error" }))
        }
        JsonRejection::MissingJsonContentType(_) => (
            "expected Content-Type: application/json".to_string(),
            json!({ "kind": "missing_content_type" }),
        ),
        JsonRejection::BytesRejection(e) => {
            (format!("request body error: {e}"), json!({ "kind": "body_error" }))
        }
        other => (format!("request body error: {other}"), json!({ "kind": "unknown" })),
    }
}

// ── Reports ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self { valid: true, errors: Vec::new(), warnings: Vec::new() }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_error_containing(&self, needle: &str) -> bool {
        self.errors.iter().any(|error| error.contains(needle))
    }

    /// Convert a failing report into the INVALID_INPUT error carrying both lists.
    pub fn into_result(self) -> Result<Vec<String>, ApiError> {
        if self.valid {
            return Ok(self.warnings);
        }
        let message = self.errors.join("; ");
        Err(ApiError::invalid_input(message)
            .with_details(json!({ "errors": self.errors, "warnings": self.warnings })))
    }
}

pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}

pub(crate) fn check_status(report: &mut ValidationReport, status: Option<&str>) {
    if let Some(status) = status {
        if PublicationStatus::parse(status).is_none() {
            let allowed: Vec<&str> = PublicationStatus::ALL.iter().map(|s| s.as_str()).collect();
            report.error(format!("status must be one of: {}", allowed.join(", ")));
        }
    }
}
