//! Artifact intake HTTP server.
//!
//! Exposes the [`ArtifactService`] as a small JSON API. The key-value
//! backend is chosen from configuration and injected into the service when
//! the router is built; handlers never reach storage any other way.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/submit` | Submit an artifact; returns its content-derived id |
//! | `GET`  | `/artifacts` | List up to `store.list_limit` artifacts (`?limit=N` narrows) |
//! | `GET`  | `/artifact/{id}` | Fetch one artifact |
//! | `GET`  | `/health` | Liveness probe (returns the service name) |
//! | `OPTIONS` | any | Preflight; empty 200 |
//!
//! # Error Contract
//!
//! Every failure is a JSON object with a single message:
//!
//! ```json
//! { "error": "Missing required fields: kind, content" }
//! ```
//!
//! Status codes: 400 for unparseable or invalid submissions, 404 for
//! unknown ids and unmatched routes (wrong method included), 500 for
//! storage failures.
//!
//! # CORS
//!
//! See [`crate::cors`]; the allow-list comes from `server.allowed_origins`
//! or the `ALLOWED_ORIGINS` environment variable.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        DefaultBodyLimit, Path, Query, State,
    },
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use r2agi_core::error::{ServiceError, INVALID_BODY};
use r2agi_core::models::{Artifact, ArtifactList, HealthResponse, SubmitResponse};
use r2agi_core::service::ArtifactService;
use r2agi_core::store::KvStore;

use crate::config::Config;
use crate::cors::{apply_cors, CorsPolicy};
use crate::db;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    service: Arc<ArtifactService>,
    service_name: Arc<str>,
}

/// Builds the service from configuration over the given backend.
pub fn build_service(
    config: &Config,
    store: Option<Arc<dyn KvStore>>,
) -> anyhow::Result<ArtifactService> {
    Ok(ArtifactService::new(store)
        .with_id_length(config.ids.id_length()?)
        .with_limits(config.limits.limits())
        .with_list_cap(config.store.list_limit))
}

/// Builds the full router (routes, fallbacks, CORS, tracing) over `store`.
pub fn router(config: &Config, store: Option<Arc<dyn KvStore>>) -> anyhow::Result<Router> {
    let service = build_service(config, store)?;
    let body_limit = service.limits().max_body_bytes();

    let state = AppState {
        service: Arc::new(service),
        service_name: Arc::from(config.server.service_name.as_str()),
    };
    let cors = Arc::new(CorsPolicy::from_origins(&config.server.allowed_origins));

    Ok(Router::new()
        .route(
            "/submit",
            post(handle_submit)
                .options(handle_preflight)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/artifacts", get(handle_list).options(handle_preflight))
        .route("/artifact/{id}", get(handle_get).options(handle_preflight))
        .route("/health", get(handle_health).options(handle_preflight))
        .fallback(handle_fallback)
        .method_not_allowed_fallback(handle_not_found)
        .layer(middleware::from_fn_with_state(cors, apply_cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// Starts the intake server.
///
/// Opens the configured backend, binds to `[server].bind`, and serves until
/// the process receives Ctrl-C.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = db::open_backend(config).await?;
    if store.is_none() {
        tracing::warn!("no storage backend configured; submissions will not be persisted");
    }

    let app = router(config, store)?;
    let bind_addr = &config.server.bind;

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(
        bind = %bind_addr,
        service = %config.server.service_name,
        backend = ?config.store.backend,
        "intake server listening"
    );
    println!("Intake server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Internal error type that converts into an Axum HTTP response.
enum AppError {
    Service(ServiceError),
    RouteNotFound,
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        AppError::Service(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::RouteNotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Service(e) => {
                let status = match e {
                    ServiceError::InvalidBody(_) | ServiceError::Validation(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    ServiceError::NotFound => StatusCode::NOT_FOUND,
                    ServiceError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
        };

        match &self {
            AppError::Service(ServiceError::Storage { context, source }) => {
                tracing::error!(
                    status = %status,
                    error = %context,
                    cause = %source,
                    "storage failure"
                );
            }
            AppError::Service(ServiceError::InvalidBody(cause)) => {
                tracing::warn!(status = %status, cause = %cause, "rejected request body");
            }
            AppError::Service(e) if e.is_client_error() => {
                tracing::warn!(status = %status, error = %message, "client error");
            }
            _ => {
                tracing::debug!(status = %status, "no route");
            }
        }

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

// ============ POST /submit ============

/// Handler for `POST /submit`.
///
/// The body is taken as raw bytes so that any parse failure (including an
/// oversized or unreadable body) is reported through the service's own
/// error contract rather than an extractor rejection.
async fn handle_submit(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SubmitResponse>, AppError> {
    let body = body.map_err(|rejection| {
        tracing::warn!(error = %rejection, "unreadable submit body");
        AppError::Service(ServiceError::Validation(INVALID_BODY.to_string()))
    })?;
    let response = state.service.submit(&body).await?;
    Ok(Json(response))
}

// ============ GET /artifacts ============

/// Query parameters for `GET /artifacts`. A `limit` that is not a number
/// is ignored.
#[derive(Debug, Deserialize)]
struct ListParams {
    limit: Option<String>,
}

/// Handler for `GET /artifacts`. An unparseable query string (a repeated
/// `limit`, say) is treated as no limit given.
async fn handle_list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ArtifactList>, AppError> {
    let limit = match params {
        Ok(Query(params)) => params.limit.and_then(|l| l.trim().parse::<usize>().ok()),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "ignoring unparseable list query");
            None
        }
    };
    Ok(Json(state.service.list(limit).await?))
}

// ============ GET /artifact/{id} ============

/// Handler for `GET /artifact/{id}`. An id segment that does not decode
/// (invalid UTF-8) cannot name a stored artifact, so it is a miss.
async fn handle_get(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Artifact>, AppError> {
    let Path(id) = id.map_err(|rejection| {
        tracing::debug!(error = %rejection, "undecodable artifact id");
        AppError::Service(ServiceError::NotFound)
    })?;
    Ok(Json(state.service.get(&id).await?))
}

// ============ GET /health ============

/// Handler for `GET /health`. Never touches the backend.
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: state.service_name.to_string(),
    })
}

// ============ OPTIONS / fallbacks ============

async fn handle_preflight() -> StatusCode {
    StatusCode::OK
}

async fn handle_fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        AppError::RouteNotFound.into_response()
    }
}

async fn handle_not_found() -> AppError {
    AppError::RouteNotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use r2agi_core::store::memory::InMemoryStore;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        router(&Config::default(), Some(store)).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Response) {
        let response = app.clone().oneshot(request).await.unwrap();
        (response.status(), response)
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn submit_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/submit")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_submit_and_get() {
        let app = app();
        let (status, resp) = send(
            &app,
            submit_request(r#"{"kind":"note","content":"hello world"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["artifact_id"], "b94d27b9934d3e08");
        assert_eq!(body["message"], "Artifact submitted for processing");

        let (status, resp) = send(&app, get_request("/artifact/b94d27b9934d3e08")).await;
        assert_eq!(status, StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["id"], "b94d27b9934d3e08");
        assert_eq!(body["kind"], "note");
        assert_eq!(body["content"], "hello world");
        assert_eq!(body["status"], "pending");
        assert_eq!(body["submitter"], "public");
        assert_eq!(body["tags"], json!([]));
        assert!(body["source_url"].is_null());
        assert!(body["ingested_at"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_submit_missing_fields() {
        let app = app();
        let (status, resp) = send(&app, submit_request("{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({"error": "Missing required fields: kind, content"})
        );
    }

    #[tokio::test]
    async fn test_submit_invalid_json() {
        let app = app();
        let (status, resp) = send(&app, submit_request("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({"error": INVALID_BODY}));
    }

    #[tokio::test]
    async fn test_submit_over_content_cap() {
        let mut cfg = Config::default();
        cfg.limits.max_content_bytes = 5;
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        let app = router(&cfg, Some(store)).unwrap();

        let (status, resp) = send(
            &app,
            submit_request(r#"{"kind":"note","content":"too long"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "content exceeds 5 bytes");
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let app = app();
        let (status, resp) = send(&app, get_request("/artifact/nonexistent-id")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await, json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn test_submit_oversized_body() {
        let mut cfg = Config::default();
        cfg.limits.max_content_bytes = 5;
        let store: Arc<dyn KvStore> = Arc::new(InMemoryStore::new());
        let app = router(&cfg, Some(store.clone())).unwrap();

        let max_body = cfg.limits.limits().max_body_bytes();
        let body = format!(
            r#"{{"kind":"note","content":"{}"}}"#,
            "x".repeat(max_body + 1)
        );
        let (status, resp) = send(&app, submit_request(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_json(resp).await, json!({"error": INVALID_BODY}));
        assert!(store.list(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_undecodable_id_is_not_found() {
        let app = app();
        let (status, resp) = send(&app, get_request("/artifact/%FF")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_json(resp).await, json!({"error": "Not found"}));
    }

    #[tokio::test]
    async fn test_list_ignores_unparseable_query() {
        let app = app();
        for content in ["one", "two", "three"] {
            let body = format!(r#"{{"kind":"note","content":"{}"}}"#, content);
            send(&app, submit_request(&body)).await;
        }

        let (status, resp) = send(&app, get_request("/artifacts?limit=1&limit=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = body_json(resp).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["artifacts"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_list_empty_and_populated() {
        let app = app();
        let (status, resp) = send(&app, get_request("/artifacts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"count": 0, "artifacts": []}));

        for content in ["one", "two", "three"] {
            let body = format!(r#"{{"kind":"note","content":"{}"}}"#, content);
            send(&app, submit_request(&body)).await;
        }

        let (_, resp) = send(&app, get_request("/artifacts")).await;
        let body = body_json(resp).await;
        assert_eq!(body["count"], 3);
        assert_eq!(body["artifacts"].as_array().unwrap().len(), 3);

        let (_, resp) = send(&app, get_request("/artifacts?limit=2")).await;
        assert_eq!(body_json(resp).await["count"], 2);

        let (_, resp) = send(&app, get_request("/artifacts?limit=abc")).await;
        assert_eq!(body_json(resp).await["count"], 3);
    }

    #[tokio::test]
    async fn test_list_without_backend() {
        let app = router(&Config::default(), None).unwrap();
        let (status, resp) = send(&app, get_request("/artifacts")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"count": 0, "artifacts": []}));
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();
        let (status, resp) = send(&app, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body_json(resp).await,
            json!({"status": "ok", "service": "r2agi-api"})
        );
    }

    #[tokio::test]
    async fn test_unknown_route_and_wrong_method() {
        let app = app();
        let (status, resp) = send(&app, get_request("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await, json!({"error": "Not found"}));

        let (status, resp) = send(&app, get_request("/submit")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await, json!({"error": "Not found"}));

        let request = Request::builder()
            .method("POST")
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_options_anywhere() {
        let app = app();
        for uri in ["/submit", "/artifacts", "/anything/else"] {
            let request = Request::builder()
                .method("OPTIONS")
                .uri(uri)
                .header(header::ORIGIN, "https://site.example")
                .body(Body::empty())
                .unwrap();
            let (status, resp) = send(&app, request).await;
            assert_eq!(status, StatusCode::OK, "OPTIONS {}", uri);
            assert_eq!(resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(
                resp.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
                "GET, POST, OPTIONS"
            );
            let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn test_cors_allow_list_on_errors_too() {
        let mut cfg = Config::default();
        cfg.server.allowed_origins = vec![
            "https://roads.example".to_string(),
            "http://localhost:4321".to_string(),
        ];
        let app = router(&cfg, None).unwrap();

        let request = Request::builder()
            .uri("/artifact/missing")
            .header(header::ORIGIN, "http://localhost:4321")
            .body(Body::empty())
            .unwrap();
        let (status, resp) = send(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:4321"
        );
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "https://evil.example")
            .body(Body::empty())
            .unwrap();
        let (_, resp) = send(&app, request).await;
        assert_eq!(
            resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://roads.example"
        );
        assert_eq!(resp.headers()[header::VARY], "Origin");
    }
}
