use axum::extract::State;
use axum::http::header;
use axum::{Json, response::IntoResponse};
use lvai_derive::{api_handler, api_model};
use lvai_domain::config::ApiConfig;
use lvai_domain::constants::SYSTEM_TAG;
use std::sync::LazyLock;
use std::time::Instant;

#[api_model]
/// Health check response
pub struct HealthResponse {
    /// Always `healthy` while the process serves requests
    pub status: String,
    /// Application name
    pub app: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime: u64,
}

#[api_model]
/// Service landing document
pub struct RootResponse {
    pub message: String,
    /// Docs UI path, or a note that docs are disabled
    pub docs: String,
    pub health: String,
}

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Anchors the uptime clock; called once when the server starts.
pub fn mark_started() {
    LazyLock::force(&START_TIME);
}

#[api_handler(
    get,
    path = "/health",
    responses((status = OK, description = "Healthcheck endpoint", body = HealthResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(config): State<ApiConfig>) -> impl IntoResponse {
    let body = HealthResponse {
        status: "healthy".to_owned(),
        app: config.app.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        uptime: START_TIME.elapsed().as_secs(),
    };

    (
        [
            (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            (header::PRAGMA, "no-cache"),
        ],
        Json(body),
    )
}

#[api_handler(
    get,
    path = "/",
    responses((status = OK, description = "Service landing document", body = RootResponse)),
    tag = SYSTEM_TAG,
)]
pub(super) async fn root_handler(State(config): State<ApiConfig>) -> Json<RootResponse> {
    let docs = if config.app.debug { "/docs" } else { "Docs are disabled outside debug mode" };

    Json(RootResponse {
        message: format!("{} API", config.app.name),
        docs: docs.to_owned(),
        health: "/health".to_owned(),
    })
}
