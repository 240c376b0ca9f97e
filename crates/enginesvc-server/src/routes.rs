//! Binds the engine operations to HTTP routes.
//!
//! Every handler runs the same pipeline: decode with the shared codec, call
//! the service, encode the outcome. Failures are logged here with the
//! operation, the engine id and the elapsed time before being written out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use enginesvc_core::transport::{
    self, GetEngineResponse, Operation, RegisterEngineResponse,
};
use enginesvc_core::{EngineError, EngineService, GetEngine, RegisterEngine};
use serde::Serialize;

/// Mounts `POST /engines/` and `GET /engines/:id` over `service`.
///
/// Unknown paths and methods are left to whatever router this is merged into.
pub fn engine_routes<S: EngineService + 'static>(service: Arc<S>) -> Router {
    Router::new()
        .route(RegisterEngine::ROUTE, post(register_engine::<S>))
        .route(GetEngine::ROUTE, get(get_engine::<S>))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/engines/",
    request_body = enginesvc_core::Engine,
    responses(
        (status = 200, description = "Engine registered", body = RegisterEngineResponse),
        (status = 400, description = "Engine pre-exists in registry", body = transport::ErrorBody),
        (status = 500, description = "Malformed request body", body = transport::ErrorBody)
    )
)]
pub async fn register_engine<S: EngineService + 'static>(
    State(service): State<Arc<S>>,
    body: Bytes,
) -> Response {
    let begin = Instant::now();
    let (id, result) = match transport::decode_register_request(&body) {
        Ok(request) => {
            let id = request.engine.id.clone();
            let result = service
                .register(request.engine)
                .await
                .map(|()| RegisterEngineResponse::default());
            (id, result)
        }
        Err(err) => (String::new(), Err(err)),
    };
    respond(RegisterEngine::NAME, &id, begin, result)
}

#[utoipa::path(
    get,
    path = "/engines/{id}",
    params(("id" = String, Path, description = "Engine id")),
    responses(
        (status = 200, description = "Engine found", body = GetEngineResponse),
        (status = 404, description = "Engine not exist in registry", body = transport::ErrorBody)
    )
)]
pub async fn get_engine<S: EngineService + 'static>(
    State(service): State<Arc<S>>,
    vars: Option<Path<HashMap<String, String>>>,
) -> Response {
    let begin = Instant::now();
    let vars = vars.map(|Path(vars)| vars).unwrap_or_default();
    let result = match transport::decode_get_engine_request(&vars) {
        Ok(request) => service
            .get_engine(&request.id)
            .await
            .map(|engine| GetEngineResponse {
                engine: Some(engine),
                error: None,
            }),
        Err(err) => Err(err),
    };
    let id = vars.get("id").map(String::as_str).unwrap_or_default();
    respond(GetEngine::NAME, id, begin, result)
}

fn respond<T: Serialize>(
    method: &'static str,
    id: &str,
    begin: Instant,
    result: Result<T, EngineError>,
) -> Response {
    if let Err(err) = &result {
        log_failure(method, id, begin.elapsed(), err);
    }
    let (status, body) = transport::encode_response(result);

    metrics::counter!(
        "enginesvc_requests_total",
        "method" => method,
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!("enginesvc_request_duration_seconds", "method" => method)
        .record(begin.elapsed().as_secs_f64());

    (status, Json(body)).into_response()
}

fn log_failure(method: &str, id: &str, took: Duration, err: &EngineError) {
    if err.is_domain() {
        tracing::warn!(method, id, ?took, err = %err, "request rejected");
    } else {
        tracing::error!(method, id, ?took, err = %err, "request failed");
    }
}
