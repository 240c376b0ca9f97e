//! JSON-over-HTTP codec for the engine operations.
//!
//! Each operation is described by a zero-sized type implementing
//! [`Operation`]: its method, route, request and response shapes, and how a
//! request becomes a URL and body. Server-side decoding and response
//! encoding live here too so the two ends cannot drift apart.
//!
//! Domain errors are carried in the body as `{"error": "<message>"}` with a
//! 4xx status. Clients treat those as answers, not as faults: only 5xx
//! statuses, unreadable bodies and connection failures become
//! [`EngineError::Transport`], which is the one retryable kind.

use std::collections::HashMap;

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use url::Url;
use utoipa::ToSchema;

use crate::{Engine, EngineError};

/// A request ready to put on the wire.
#[derive(Debug, Clone)]
pub struct EncodedRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

/// A response shape that may carry a domain error in its body.
pub trait Errorer {
    fn error(&self) -> Option<&str>;
}

/// Compile-time descriptor of one remote operation.
pub trait Operation: Send + Sync + 'static {
    type Request: Clone + Send + Sync + 'static;
    type Response: Serialize + DeserializeOwned + Errorer + Send + 'static;

    const NAME: &'static str;
    const METHOD: Method;
    /// Route template in the server router's syntax.
    const ROUTE: &'static str;

    /// Builds the request against an instance's base URL.
    fn encode_request(base: &Url, request: &Self::Request) -> Result<EncodedRequest, EngineError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterEngineRequest {
    pub engine: Engine,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RegisterEngineResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetEngineRequest {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GetEngineResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<Engine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body written for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "Engine not exist in registry")]
    pub error: String,
}

impl Errorer for RegisterEngineResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Errorer for GetEngineResponse {
    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl RegisterEngineResponse {
    pub fn into_result(self) -> Result<(), EngineError> {
        match self.error {
            Some(message) => Err(EngineError::from_message(message)),
            None => Ok(()),
        }
    }
}

impl GetEngineResponse {
    pub fn into_result(self) -> Result<Engine, EngineError> {
        match (self.engine, self.error) {
            (_, Some(message)) => Err(EngineError::from_message(message)),
            (Some(engine), None) => Ok(engine),
            (None, None) => Err(EngineError::Transport(
                "response carried neither engine nor error".to_string(),
            )),
        }
    }
}

/// `POST /engines/`
#[derive(Debug, Clone, Copy)]
pub struct RegisterEngine;

/// `GET /engines/{id}`
#[derive(Debug, Clone, Copy)]
pub struct GetEngine;

impl Operation for RegisterEngine {
    type Request = RegisterEngineRequest;
    type Response = RegisterEngineResponse;

    const NAME: &'static str = "register_engine";
    const METHOD: Method = Method::POST;
    const ROUTE: &'static str = "/engines/";

    fn encode_request(base: &Url, request: &Self::Request) -> Result<EncodedRequest, EngineError> {
        check_id(&request.engine.id)?;
        let body = serde_json::to_vec(&request.engine)
            .map_err(|e| EngineError::MalformedRequest(e.to_string()))?;
        Ok(EncodedRequest {
            method: Self::METHOD,
            url: engines_url(base, "")?,
            body: Some(body),
        })
    }
}

impl Operation for GetEngine {
    type Request = GetEngineRequest;
    type Response = GetEngineResponse;

    const NAME: &'static str = "get_engine";
    const METHOD: Method = Method::GET;
    const ROUTE: &'static str = "/engines/:id";

    fn encode_request(base: &Url, request: &Self::Request) -> Result<EncodedRequest, EngineError> {
        check_id(&request.id)?;
        Ok(EncodedRequest {
            method: Self::METHOD,
            url: engines_url(base, &request.id)?,
            body: None,
        })
    }
}

/// Rejects ids that cannot be carried as a single path segment.
///
/// URL parsers collapse `.` and `..` segments, and their `%2E` spellings,
/// so a `GET` for those ids would never reach `/engines/{id}`.
pub fn check_id(id: &str) -> Result<(), EngineError> {
    match id {
        "" => Err(EngineError::MalformedRequest("engine id must not be empty".to_string())),
        "." | ".." => Err(EngineError::MalformedRequest(format!(
            "engine id {id:?} is not a valid path segment"
        ))),
        _ => Ok(()),
    }
}

/// `/engines/<segment>` under `base`, with the segment percent-escaped.
fn engines_url(base: &Url, segment: &str) -> Result<Url, EngineError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| EngineError::Transport(format!("instance url {base} cannot carry a path")))?
        .clear()
        .push("engines")
        .push(segment);
    Ok(url)
}

/// Parses a registration body straight into an engine.
pub fn decode_register_request(body: &[u8]) -> Result<RegisterEngineRequest, EngineError> {
    let engine: Engine =
        serde_json::from_slice(body).map_err(|e| EngineError::MalformedRequest(e.to_string()))?;
    check_id(&engine.id)?;
    Ok(RegisterEngineRequest { engine })
}

/// Pulls the `id` path variable out of the router's captures.
pub fn decode_get_engine_request(
    vars: &HashMap<String, String>,
) -> Result<GetEngineRequest, EngineError> {
    let id = vars.get("id").ok_or(EngineError::Routing)?;
    Ok(GetEngineRequest { id: id.clone() })
}

/// Turns a handler outcome into a status and JSON body.
///
/// Errors never reach the normal body: they are written as [`ErrorBody`]
/// with the status from [`EngineError::status_code`].
pub fn encode_response<T: Serialize>(result: Result<T, EngineError>) -> (StatusCode, Value) {
    let encoded = result.and_then(|response| {
        serde_json::to_value(response).map_err(|e| EngineError::Transport(e.to_string()))
    });
    match encoded {
        Ok(body) => (StatusCode::OK, body),
        Err(err) => encode_error(&err),
    }
}

pub fn encode_error(err: &EngineError) -> (StatusCode, Value) {
    (err.status_code(), json!({ "error": err.to_string() }))
}

/// Client-side response decoding.
///
/// A 4xx answer whose body names an error is returned as `Ok`, with the error
/// embedded, so dispatch does not retry it. Everything else that is not a
/// clean 2xx becomes [`EngineError::Transport`].
pub fn decode_response<O: Operation>(
    status: StatusCode,
    body: &[u8],
) -> Result<O::Response, EngineError> {
    let response = match serde_json::from_slice::<O::Response>(body) {
        Ok(response) => response,
        Err(e) if status.is_success() => {
            return Err(EngineError::Transport(format!(
                "{}: undecodable response body: {e}",
                O::NAME
            )));
        }
        Err(_) => {
            return Err(EngineError::Transport(format!(
                "{}: unexpected status {status}",
                O::NAME
            )));
        }
    };

    match response.error() {
        None if status.is_success() => Ok(response),
        Some(_) if status.is_client_error() => Ok(response),
        Some(message) => Err(EngineError::Transport(format!(
            "{}: server answered {status}: {message}",
            O::NAME
        ))),
        None => Err(EngineError::Transport(format!(
            "{}: unexpected status {status}",
            O::NAME
        ))),
    }
}
