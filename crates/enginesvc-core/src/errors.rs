use http::StatusCode;

/// Errors for the engine service, shared by the server and the client.
///
/// The first three variants are domain outcomes produced by the registry.
/// They travel inside response bodies and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Engine not exist in registry")]
    NotFound,

    #[error("Engine pre-exists in registry")]
    AlreadyExists,

    #[error("Inconsistent Engine IDs")]
    InconsistentIdentifiers,

    /// A path variable the route promised was missing. Always a server bug.
    #[error("Error in the routing")]
    Routing,

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("no instances available")]
    NoInstancesAvailable,

    /// A client-error response whose message matches no known kind.
    #[error("{0}")]
    Remote(String),
}

impl EngineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::NotFound => StatusCode::NOT_FOUND,
            EngineError::AlreadyExists
            | EngineError::InconsistentIdentifiers
            | EngineError::Remote(_) => StatusCode::BAD_REQUEST,
            EngineError::Routing
            | EngineError::MalformedRequest(_)
            | EngineError::Transport(_)
            | EngineError::NoInstancesAvailable => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Business-logic outcome rather than an infrastructure fault.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            EngineError::NotFound
                | EngineError::AlreadyExists
                | EngineError::InconsistentIdentifiers
                | EngineError::Remote(_)
        )
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Transport(_))
    }

    /// Restores the error kind from a message carried in an error body.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        [
            EngineError::NotFound,
            EngineError::AlreadyExists,
            EngineError::InconsistentIdentifiers,
        ]
        .into_iter()
        .find(|kind| kind.to_string() == message)
        .unwrap_or(EngineError::Remote(message))
    }
}
