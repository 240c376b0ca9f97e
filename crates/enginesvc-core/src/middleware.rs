use std::time::Instant;

use tower::Layer;

use crate::{Engine, EngineError, EngineService};

/// Wraps an [`EngineService`] in [`Logging`].
///
/// Stack it with `tower::ServiceBuilder` at startup:
///
/// ```
/// use enginesvc_core::{EngineRegistry, LoggingLayer};
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(LoggingLayer::new("server"))
///     .service(EngineRegistry::new());
/// ```
#[derive(Debug, Clone)]
pub struct LoggingLayer {
    component: &'static str,
}

impl LoggingLayer {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            component: self.component,
        }
    }
}

/// Records method, id, elapsed time and outcome of every call before
/// handing the result back unchanged.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    component: &'static str,
}

impl<S> Logging<S> {
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: EngineService> EngineService for Logging<S> {
    async fn register(&self, engine: Engine) -> Result<(), EngineError> {
        let id = engine.id.clone();
        let begin = Instant::now();
        let result = self.inner.register(engine).await;
        log_call(self.component, "register", &id, begin, result.as_ref().err());
        result
    }

    async fn get_engine(&self, id: &str) -> Result<Engine, EngineError> {
        let begin = Instant::now();
        let result = self.inner.get_engine(id).await;
        log_call(self.component, "get_engine", id, begin, result.as_ref().err());
        result
    }
}

fn log_call(component: &str, method: &str, id: &str, begin: Instant, err: Option<&EngineError>) {
    let took = begin.elapsed();
    match err {
        None => tracing::info!(component, method, id, ?took, "call completed"),
        Some(err) if err.is_domain() => {
            tracing::info!(component, method, id, ?took, err = %err, "call rejected")
        }
        Some(err) => tracing::warn!(component, method, id, ?took, err = %err, "call failed"),
    }
}
