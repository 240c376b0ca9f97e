use std::future::Future;

use enginesvc_core::EngineError;

/// A callable remote operation.
///
/// A successful call may still carry a domain error inside `Response`; only
/// an `Err` counts as a failed attempt.
pub trait Endpoint: Send + Sync + 'static {
    type Request: Clone + Send + Sync + 'static;
    type Response: Send + 'static;

    fn call(
        &self,
        request: Self::Request,
    ) -> impl Future<Output = Result<Self::Response, EngineError>> + Send;
}

/// Builds the endpoint for one instance address.
pub type Factory<E> = Box<dyn Fn(&str) -> Result<E, EngineError> + Send + Sync>;
