// HTTP surface: health probes, the RPC router and the shared middleware stack.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, State},
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    cors::cors_layer,
    error::{
        attach_request_id_header, current_request_id, request_id_from_headers_or_generate,
        with_request_id_scope, ApiError,
    },
    repository::Repositories,
    rpc::{self, AppState},
    validation::MAX_BODY_BYTES,
};

pub fn build_router(state: AppState, cors_origins: Option<&str>) -> Router {
    let probes = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .with_state(state.repositories.clone());

    apply_middleware(probes.merge(rpc::router(state))).layer(cors_layer(cors_origins))
}

pub fn apply_middleware(router: Router) -> Router {
    router
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(panic_handler))
        .layer(middleware::from_fn(request_context_middleware))
}

async fn healthz() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

async fn readyz(State(repositories): State<Repositories>) -> Response {
    let storage = repositories.backend_name();
    match repositories.check_health().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ready", "storage": storage })))
            .into_response(),
        Err(error) => {
            warn!(storage, error = %error, "readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable", "storage": storage })),
            )
                .into_response()
        }
    }
}

async fn panic_handler(request: Request<Body>, next: Next) -> Response {
    // Task-locals do not cross `tokio::spawn`; carry the request id over.
    let request_id = current_request_id();
    let task = tokio::spawn(async move {
        match request_id {
            Some(request_id) => with_request_id_scope(request_id, next.run(request)).await,
            None => next.run(request).await,
        }
    });

    match task.await {
        Ok(response) => response,
        Err(join_error) => {
            error!(?join_error, "request handling panicked");
            ApiError::internal().into_response()
        }
    }
}

async fn request_context_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = request_id_from_headers_or_generate(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let mut response = with_request_id_scope(request_id.clone(), next.run(request)).await;
    attach_request_id_header(&mut response, &request_id);

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = started_at.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}
