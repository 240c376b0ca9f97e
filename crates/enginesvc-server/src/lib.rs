pub mod config;
pub mod openapi;
pub mod routes;

use std::sync::Arc;

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use enginesvc_core::EngineService;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use config::ServerConfig;
pub use openapi::ApiDoc;
pub use routes::engine_routes;

/// Full application router: the engine routes plus health, metrics and the
/// OpenAPI document.
pub fn app<S: EngineService + 'static>(service: Arc<S>, metrics: PrometheusHandle) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/metrics",
            get(move || {
                let rendered = metrics.render();
                async move { rendered }
            }),
        )
        .route("/api-docs/openapi.json", get(openapi_json))
        .merge(engine_routes(service))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}
