use std::future::Future;

use axum::{
    http::{header::HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use folio_common::protocol::envelope::{codes, ErrorBody, ErrorEnvelope};
use folio_common::roles::WorkspaceTokenMap;
use serde_json::Value;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

tokio::task_local! {
    static REQUEST_ID: String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidInput,
    Unauthenticated,
    WorkspaceUnauthorized,
    NotFound,
    UpdateFailed,
    InternalError,
}

impl ErrorCode {
    pub const ALL: [Self; 6] = [
        Self::InvalidInput,
        Self::Unauthenticated,
        Self::WorkspaceUnauthorized,
        Self::NotFound,
        Self::UpdateFailed,
        Self::InternalError,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => codes::INVALID_INPUT,
            Self::Unauthenticated => codes::UNAUTHENTICATED,
            Self::WorkspaceUnauthorized => codes::WORKSPACE_UNAUTHORIZED,
            Self::NotFound => codes::NOT_FOUND,
            Self::UpdateFailed => codes::UPDATE_FAILED,
            Self::InternalError => codes::INTERNAL_ERROR,
        }
    }

    pub const fn status(self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::WorkspaceUnauthorized => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::UpdateFailed => StatusCode::CONFLICT,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidInput => "request validation failed",
            Self::Unauthenticated => "caller must be authenticated",
            Self::WorkspaceUnauthorized => "workspace access denied",
            Self::NotFound => "requested resource not found",
            Self::UpdateFailed => "update did not apply",
            Self::InternalError => "internal server error",
        }
    }
}

/// Failure rendered as the uniform `{success: false, error}` envelope.
#[derive(Debug, Clone)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    details: Option<Value>,
    request_id: Option<String>,
    workspace_tokens: Option<WorkspaceTokenMap>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            request_id: None,
            workspace_tokens: None,
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::invalid_input(format!("{field} is required"))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn internal() -> Self {
        Self::from_code(ErrorCode::InternalError)
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Attach the refreshed credentials of a caller who already passed authorization.
    pub fn with_workspace_tokens(mut self, workspace_tokens: WorkspaceTokenMap) -> Self {
        self.workspace_tokens = Some(workspace_tokens);
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = self.request_id.or_else(current_request_id);

        let envelope = ErrorEnvelope {
            success: false,
            error: ErrorBody {
                code: self.code.as_str().to_owned(),
                message: self.message,
                details: self.details,
                request_id: request_id.clone(),
            },
            workspace_tokens: self.workspace_tokens,
        };

        let mut response = (self.code.status(), Json(envelope)).into_response();

        if let Some(request_id) = request_id {
            attach_request_id_header(&mut response, &request_id);
        }

        response
    }
}

pub async fn with_request_id_scope<F>(request_id: String, future: F) -> F::Output
where
    F: Future,
{
    REQUEST_ID.scope(request_id, future).await
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}

pub fn request_id_from_headers_or_generate(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.trim().is_empty())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub fn attach_request_id_header(response: &mut Response, request_id: &str) {
    if let Ok(header) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, header);
    }
}
