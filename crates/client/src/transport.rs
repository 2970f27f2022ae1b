// Remote procedure transport.
//
// `RpcTransport` is the seam between the typed services and the network.
// `HttpTransport` posts JSON to `{base_url}/v1/rpc/{method}`, injects the
// stored workspace token and absorbs the rotated tokens from every reply.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use folio_common::protocol::envelope::{codes, Envelope};
use folio_common::protocol::rpc_methods::rpc_path;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::tokens::TokenStore;

const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with an error envelope.
    #[error("{code}: {message}")]
    Rpc { code: String, message: String, details: Option<Value> },
    #[error("no workspace token stored for workspace {0}")]
    MissingWorkspaceToken(Uuid),
    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rpc { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self.code(), Some(codes::UNAUTHENTICATED | codes::WORKSPACE_UNAUTHORIZED))
            || matches!(self, Self::MissingWorkspaceToken(_))
    }
}

#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Invoke `method` in `workspace_id`; returns the success payload without
    /// the envelope fields.
    async fn call(&self, method: &str, workspace_id: Uuid, body: Value)
        -> Result<Value, ClientError>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    identity_token: String,
    tokens: Arc<TokenStore>,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        identity_token: impl Into<String>,
        tokens: Arc<TokenStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            identity_token: identity_token.into(),
            tokens,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(
        &self,
        method: &str,
        workspace_id: Uuid,
        mut body: Value,
    ) -> Result<Value, ClientError> {
        let token = self
            .tokens
            .token_for(workspace_id)
            .await
            .ok_or(ClientError::MissingWorkspaceToken(workspace_id))?;
        match body.as_object_mut() {
            Some(object) => {
                object.insert("workspaceToken".to_owned(), Value::String(token));
            }
            None => {
                return Err(ClientError::InvalidResponse(format!(
                    "request body for {method} must be a JSON object"
                )))
            }
        }

        let url = self.base_url.join(&rpc_path(method))?;
        debug!(%url, method, %workspace_id, "calling remote procedure");

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.identity_token))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let raw: Value = response.json().await.map_err(|error| {
            ClientError::InvalidResponse(format!("status {status} with non-JSON body: {error}"))
        })?;

        match Envelope::<Value>::from_value(raw)
            .map_err(|error| ClientError::InvalidResponse(error.to_string()))?
        {
            Envelope::Success(envelope) => {
                self.tokens.absorb(envelope.workspace_tokens).await;
                Ok(envelope.payload)
            }
            Envelope::Failure(envelope) => {
                if let Some(tokens) = envelope.workspace_tokens {
                    self.tokens.absorb(tokens).await;
                }
                Err(ClientError::Rpc {
                    code: envelope.error.code,
                    message: envelope.error.message,
                    details: envelope.error.details,
                })
            }
        }
    }
}
