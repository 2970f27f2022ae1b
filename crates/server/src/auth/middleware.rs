// Caller authentication for the RPC surface.
//
// Every remote procedure sits behind `require_caller`: the identity token in
// `Authorization: Bearer …` must verify, or the request ends with
// UNAUTHENTICATED before any handler runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{
    auth::jwt::{CallerIdentity, IdentityTokenService},
    error::{ApiError, ErrorCode},
};

/// The verified caller, stored in request extensions for handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    pub user_id: String,
    pub display_name: Option<String>,
}

impl From<CallerIdentity> for AuthenticatedCaller {
    fn from(identity: CallerIdentity) -> Self {
        Self { user_id: identity.user_id, display_name: identity.display_name }
    }
}

pub async fn require_caller(
    State(identity_service): State<Arc<IdentityTokenService>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &identity_service) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(error) => error.into_response(),
    }
}

fn authenticate(
    headers: &HeaderMap,
    identity_service: &IdentityTokenService,
) -> Result<AuthenticatedCaller, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Err(ApiError::new(ErrorCode::Unauthenticated, "missing bearer token"));
    };
    identity_service.validate_identity_token(token).map(AuthenticatedCaller::from).map_err(|error| {
        debug!(%error, "identity token rejected");
        ApiError::new(ErrorCode::Unauthenticated, "invalid bearer token")
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::tests::TEST_SECRET;
    use axum::{
        body::Body,
        extract::Extension,
        http::{HeaderValue, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn service() -> Arc<IdentityTokenService> {
        Arc::new(IdentityTokenService::new(TEST_SECRET).expect("service should initialize"))
    }

    fn whoami_app(identity_service: Arc<IdentityTokenService>) -> Router {
        Router::new()
            .route(
                "/whoami",
                get(|Extension(caller): Extension<AuthenticatedCaller>| async move {
                    format!("{}:{}", caller.user_id, caller.display_name.unwrap_or_default())
                }),
            )
            .layer(middleware::from_fn_with_state(identity_service, require_caller))
    }

    async fn call(app: Router, authorization: Option<String>) -> (StatusCode, String) {
        let mut builder = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).expect("request should build"))
            .await
            .expect("request should return a response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn missing_or_invalid_tokens_fail_closed() {
        for authorization in [None, Some("Bearer invalid-token".to_owned()), Some("Basic abc".to_owned())] {
            let (status, body) = call(whoami_app(service()), authorization.clone()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "authorization: {authorization:?}");
            assert!(body.contains("UNAUTHENTICATED"), "body: {body}");
        }
    }

    #[tokio::test]
    async fn valid_token_exposes_the_caller_to_handlers() {
        let service = service();
        let token =
            service.issue_identity_token("user-7", Some("Grace")).expect("token should be issued");

        let (status, body) = call(whoami_app(service), Some(format!("bearer {token}"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "user-7:Grace");
    }

    #[test]
    fn bearer_token_parsing() {
        let headers = |value: &'static str| {
            let mut headers = HeaderMap::new();
            headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
            headers
        };

        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("BEARER  abc ")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
